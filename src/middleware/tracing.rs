use std::time::Instant;

use http::{Request, Response};
use tracing::{info, info_span, warn};

use super::{Middleware, Next};
use crate::error::RoutingError;

/// Wraps the rest of the chain in a `request` span and logs its outcome
/// with latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl<B> Middleware<B> for TracingMiddleware {
    fn handle(
        &self,
        req: Request<B>,
        res: Response<B>,
        next: Next<'_, B>,
    ) -> Result<Response<B>, RoutingError> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let span = info_span!("request", method = %method, path = %path);
        let _entered = span.enter();

        let start = Instant::now();
        let result = next(req, res);
        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(res) => info!(status = res.status().as_u16(), latency_ms, "Request completed"),
            Err(e) => warn!(
                status = e.status().as_u16(),
                error = %e,
                latency_ms,
                "Request failed"
            ),
        }
        result
    }
}
