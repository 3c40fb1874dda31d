use std::fmt;
use std::sync::Arc;

use http::{Request, Response};
use tracing::{debug, error};

use super::registry::ControllerRegistry;
use super::types::{HandlerFn, Reply};
use crate::collector::HandlerKey;
use crate::error::RoutingError;
use crate::router::ParamVec;

/// A handler ready to be invoked for one request.
///
/// Created per dispatch and dropped with it.
pub struct ResolvedHandler<B> {
    label: String,
    handler: HandlerFn<B>,
}

impl<B> ResolvedHandler<B> {
    /// Wrap a callable with the label used in logs and errors
    pub fn new(label: impl Into<String>, handler: HandlerFn<B>) -> Self {
        Self {
            label: label.into(),
            handler,
        }
    }

    /// `Class:method` or `closure#N`
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the handler
    pub fn call(&self, req: &Request<B>, res: Response<B>, params: &ParamVec) -> Reply<B> {
        (self.handler)(req, res, params)
    }
}

impl<B> fmt::Debug for ResolvedHandler<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Turns matched [`HandlerKey`]s into invocable handlers.
///
/// Inline keys index the handler table captured from the route collector;
/// deferred keys go through the [`ControllerRegistry`].
pub struct HandlerResolver<B> {
    registry: Arc<ControllerRegistry<B>>,
    inline: Arc<[HandlerFn<B>]>,
}

impl<B: 'static> HandlerResolver<B> {
    /// Create a resolver over a registry and an inline handler table
    pub fn new(registry: Arc<ControllerRegistry<B>>, inline: Vec<HandlerFn<B>>) -> Self {
        Self {
            registry,
            inline: inline.into(),
        }
    }

    /// Resolve a handler key.
    ///
    /// # Errors
    ///
    /// [`RoutingError::HandlerResolution`] when a deferred reference names an
    /// unknown controller or action, when the controller factory fails, or
    /// when an inline index is outside the handler table.
    pub fn resolve(&self, key: &HandlerKey) -> Result<ResolvedHandler<B>, RoutingError> {
        let result = match key {
            HandlerKey::Inline(idx) => self
                .inline
                .get(*idx)
                .map(|f| ResolvedHandler::new(key.to_string(), Arc::clone(f)))
                .ok_or_else(|| RoutingError::HandlerResolution {
                    handler: key.to_string(),
                    reason: format!(
                        "inline handler table has {} entries, no entry {idx}",
                        self.inline.len()
                    ),
                }),
            HandlerKey::Deferred { class, method } => self
                .registry
                .bind(class, method)
                .map(|f| ResolvedHandler::new(key.to_string(), f)),
        };

        match &result {
            Ok(resolved) => debug!(handler = %resolved.label(), "Handler resolved"),
            Err(e) => error!(handler = %key, error = %e, "Handler resolution failed"),
        }
        result
    }
}

impl<B> Clone for HandlerResolver<B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            inline: Arc::clone(&self.inline),
        }
    }
}

impl<B> fmt::Debug for HandlerResolver<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerResolver")
            .field("registry", &self.registry)
            .field("inline_handlers", &self.inline.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{ActionTable, Controller};

    #[derive(Default)]
    struct Stub;

    impl Controller<String> for Stub {
        fn actions() -> ActionTable<Self, String> {
            ActionTable::new().action("handle", |_c, _req, res, _params| Reply::Response(res))
        }
    }

    fn resolver() -> HandlerResolver<String> {
        let mut registry = ControllerRegistry::<String>::new();
        registry.register::<Stub>("Stub");
        let inline: HandlerFn<String> = Arc::new(|_req: &Request<String>, _res: Response<String>, _p: &ParamVec| {
            Reply::Value(serde_json::json!("inline"))
        });
        HandlerResolver::new(Arc::new(registry), vec![inline])
    }

    #[test]
    fn test_resolves_inline_and_deferred() {
        let resolver = resolver();
        let inline = resolver.resolve(&HandlerKey::Inline(0)).unwrap();
        assert_eq!(inline.label(), "closure#0");

        let deferred = resolver
            .resolve(&HandlerKey::Deferred {
                class: "Stub".into(),
                method: "handle".into(),
            })
            .unwrap();
        assert_eq!(deferred.label(), "Stub:handle");
        let reply = deferred.call(
            &Request::new(String::new()),
            Response::new(String::new()),
            &ParamVec::new(),
        );
        assert!(matches!(reply, Reply::Response(_)));
    }

    #[test]
    fn test_unresolvable_keys() {
        let resolver = resolver();
        for key in [
            HandlerKey::Inline(3),
            HandlerKey::Deferred {
                class: "Missing".into(),
                method: "anything".into(),
            },
            HandlerKey::Deferred {
                class: "Stub".into(),
                method: "missing".into(),
            },
        ] {
            assert!(matches!(
                resolver.resolve(&key),
                Err(RoutingError::HandlerResolution { .. })
            ));
        }
    }
}
