use std::fmt;

use http::{Request, Response};
use tracing::{debug, info, info_span};

use super::{Middleware, Next};
use crate::collector::RouteCollector;
use crate::compiler::Compiler;
use crate::config::{Fallthrough, RoutingConfig};
use crate::dispatcher::{normalize_path, DispatcherAdapter, MatchResult};
use crate::error::RoutingError;
use crate::handlers::HandlerResolver;
use crate::validator::Invoker;

/// The routing middleware.
///
/// Construction collects the routes, loads the compiled table from the cache
/// or compiles it, and builds the matcher. After that every field is
/// immutable and shared by concurrent requests without locking.
pub struct Routing<B> {
    adapter: DispatcherAdapter,
    resolver: HandlerResolver<B>,
    invoker: Invoker,
    fallthrough: Fallthrough,
    fingerprint: String,
    routes_count: usize,
}

impl<B: 'static> Routing<B> {
    /// Build the middleware.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::Configuration`] for rejected route registrations or
    ///   a dispatcher factory that returns no matcher
    /// - [`RoutingError::Compile`] when the route table does not compile
    /// - [`RoutingError::Cache`] when the cache cannot be read or written,
    ///   or holds a corrupt entry
    pub fn new(config: RoutingConfig<B>) -> Result<Self, RoutingError> {
        let RoutingConfig {
            collection,
            parser,
            generator,
            dispatcher,
            cache,
            controllers,
            fallthrough,
        } = config;

        let mut collector = RouteCollector::new();
        collection(&mut collector);
        let route_set = collector.into_route_set()?;

        let fingerprint = route_set.fingerprint();
        let routes_count = route_set.len();
        if route_set.is_empty() {
            info!(routes_count = 0, "Routing table loaded with no routes");
        }

        let compiler = Compiler::new(parser, generator);
        let data = match &cache {
            Some(cache) => cache.load_or_compile(&route_set, &compiler)?,
            None => compiler.compile(&route_set)?,
        };

        let matcher = dispatcher(&data).ok_or_else(|| {
            RoutingError::config(format!(
                "dispatcher factory returned no matcher for '{}' dispatch data",
                data.generator
            ))
        })?;

        info!(
            routes_count,
            fingerprint = %fingerprint,
            cached = cache.is_some(),
            fallthrough = %fallthrough,
            "Routing middleware ready"
        );

        Ok(Self {
            adapter: DispatcherAdapter::new(matcher),
            resolver: HandlerResolver::new(controllers, route_set.into_handlers()),
            invoker: Invoker::new(),
            fallthrough,
            fingerprint,
            routes_count,
        })
    }

    /// Dispatch a request without a fallthrough continuation.
    ///
    /// No match is always [`RoutingError::RouteNotFound`].
    pub fn dispatch(&self, req: &Request<B>, res: Response<B>) -> Result<Response<B>, RoutingError> {
        let span = info_span!("routing", method = %req.method(), path = %req.uri().path());
        let _entered = span.enter();

        let outcome = self.adapter.match_request(req.method(), req.uri().path());
        self.complete(req, res, outcome)
    }

    /// Fingerprint of the collected route table
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of registered `(method, pattern)` routes
    #[must_use]
    pub fn routes_count(&self) -> usize {
        self.routes_count
    }

    /// Configured no-match policy
    #[must_use]
    pub fn fallthrough(&self) -> Fallthrough {
        self.fallthrough
    }

    fn complete(
        &self,
        req: &Request<B>,
        res: Response<B>,
        outcome: MatchResult,
    ) -> Result<Response<B>, RoutingError> {
        match outcome {
            MatchResult::Found { handler, params } => {
                let resolved = self.resolver.resolve(&handler)?;
                self.invoker.invoke(&resolved, req, res, &params)
            }
            MatchResult::NotFound => Err(RoutingError::RouteNotFound {
                method: req.method().clone(),
                path: normalize_path(req.uri().path()).into_owned(),
            }),
            MatchResult::MethodNotAllowed { allowed } => Err(RoutingError::MethodNotAllowed {
                method: req.method().clone(),
                path: normalize_path(req.uri().path()).into_owned(),
                allowed,
            }),
        }
    }
}

impl<B: 'static> Middleware<B> for Routing<B> {
    fn handle(
        &self,
        req: Request<B>,
        res: Response<B>,
        next: Next<'_, B>,
    ) -> Result<Response<B>, RoutingError> {
        let span = info_span!("routing", method = %req.method(), path = %req.uri().path());
        let _entered = span.enter();

        match self.adapter.match_request(req.method(), req.uri().path()) {
            MatchResult::NotFound if self.fallthrough == Fallthrough::Delegate => {
                debug!("No route matched, delegating to next middleware");
                next(req, res)
            }
            outcome => self.complete(&req, res, outcome),
        }
    }
}

impl<B> fmt::Debug for Routing<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routing")
            .field("fingerprint", &self.fingerprint)
            .field("routes_count", &self.routes_count)
            .field("fallthrough", &self.fallthrough)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<B> Clone for Routing<B> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            resolver: self.resolver.clone(),
            invoker: self.invoker,
            fallthrough: self.fallthrough,
            fingerprint: self.fingerprint.clone(),
            routes_count: self.routes_count,
        }
    }
}
