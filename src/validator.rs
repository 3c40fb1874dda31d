//! # Invoker Module
//!
//! Calls a resolved handler and checks its reply against the response
//! contract before it is handed back to the middleware chain.
//!
//! ## Response Contract
//!
//! A reply is valid when it is a [`Reply::Response`] carrying a status code
//! in `100..=599`. Bare values and empty replies have no status and are
//! rejected with [`RoutingError::InvalidResponse`].
//!
//! Handlers run synchronously on the calling thread. Panics are not caught
//! and no timeout is applied.

use http::{Request, Response};
use tracing::{debug, error};

use crate::error::RoutingError;
use crate::handlers::{Reply, ResolvedHandler};
use crate::router::ParamVec;

/// Handler invocation with response validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invoker;

impl Invoker {
    /// Create an invoker
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Invoke `handler` and validate what it returns.
    pub fn invoke<B>(
        &self,
        handler: &ResolvedHandler<B>,
        req: &Request<B>,
        res: Response<B>,
        params: &ParamVec,
    ) -> Result<Response<B>, RoutingError> {
        let start = std::time::Instant::now();
        let reply = handler.call(req, res, params);
        let result = Self::validate(handler.label(), reply);

        match &result {
            Ok(res) => debug!(
                handler = %handler.label(),
                status = res.status().as_u16(),
                duration_us = start.elapsed().as_micros() as u64,
                "Handler invoked"
            ),
            Err(e) => error!(handler = %handler.label(), error = %e, "Handler returned an invalid response"),
        }
        result
    }

    /// Check a reply against the response contract.
    pub fn validate<B>(label: &str, reply: Reply<B>) -> Result<Response<B>, RoutingError> {
        let invalid = |reason: String| RoutingError::InvalidResponse {
            handler: label.to_string(),
            reason,
        };
        match reply {
            Reply::Response(res) => {
                let status = res.status().as_u16();
                if (100..=599).contains(&status) {
                    Ok(res)
                } else {
                    Err(invalid(format!("status {status} is outside 100..=599")))
                }
            }
            other => Err(invalid(format!(
                "expected a response with a status code, got {}",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::Arc;

    fn resolved(reply: fn(Response<String>) -> Reply<String>) -> ResolvedHandler<String> {
        ResolvedHandler::new(
            "Stub:test",
            Arc::new(move |_req: &Request<String>, res: Response<String>, _p: &ParamVec| reply(res)),
        )
    }

    fn invoke(handler: &ResolvedHandler<String>) -> Result<Response<String>, RoutingError> {
        Invoker::new().invoke(
            handler,
            &Request::new(String::new()),
            Response::new(String::new()),
            &ParamVec::new(),
        )
    }

    #[test]
    fn test_response_passes_unchanged() {
        let handler = resolved(|mut res| {
            *res.status_mut() = StatusCode::CREATED;
            *res.body_mut() = "made".to_string();
            Reply::Response(res)
        });
        let res = invoke(&handler).unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.body(), "made");
    }

    #[test]
    fn test_non_responses_are_rejected() {
        for handler in [
            resolved(|_| Reply::Value(serde_json::json!({"ok": true}))),
            resolved(|_| Reply::Empty),
        ] {
            match invoke(&handler) {
                Err(RoutingError::InvalidResponse { handler, .. }) => {
                    assert_eq!(handler, "Stub:test");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_status_range() {
        let mut res = Response::new(String::new());
        *res.status_mut() = StatusCode::from_u16(999).unwrap();
        assert!(Invoker::validate("x", Reply::Response(res)).is_err());

        let mut res = Response::new(String::new());
        *res.status_mut() = StatusCode::CONTINUE;
        assert!(Invoker::validate("x", Reply::Response(res)).is_ok());
    }
}
