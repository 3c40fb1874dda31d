use std::fmt;
use std::sync::Arc;

use http::{Request, Response};

use crate::error::RoutingError;

/// Continuation to the rest of the chain.
///
/// Consumes the request and the response under construction. Called at most
/// once.
pub type Next<'a, B> =
    Box<dyn FnOnce(Request<B>, Response<B>) -> Result<Response<B>, RoutingError> + 'a>;

/// A stage of a middleware chain.
pub trait Middleware<B>: Send + Sync {
    /// Handle a request, optionally delegating to `next`
    fn handle(
        &self,
        req: Request<B>,
        res: Response<B>,
        next: Next<'_, B>,
    ) -> Result<Response<B>, RoutingError>;
}

/// Ordered chain of middleware ending in a terminal continuation.
pub struct Pipeline<B> {
    stages: Vec<Arc<dyn Middleware<B>>>,
}

impl<B> Pipeline<B> {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; stages run in insertion order
    #[must_use]
    pub fn with(mut self, stage: Arc<dyn Middleware<B>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Number of stages
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when there are no stages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the chain. `terminal` is reached only if every stage delegates.
    pub fn handle<'a>(
        &'a self,
        req: Request<B>,
        res: Response<B>,
        terminal: Next<'a, B>,
    ) -> Result<Response<B>, RoutingError>
    where
        B: 'a,
    {
        self.run(0, req, res, terminal)
    }

    fn run<'a>(
        &'a self,
        idx: usize,
        req: Request<B>,
        res: Response<B>,
        terminal: Next<'a, B>,
    ) -> Result<Response<B>, RoutingError>
    where
        B: 'a,
    {
        match self.stages.get(idx) {
            Some(stage) => stage.handle(
                req,
                res,
                Box::new(move |req, res| self.run(idx + 1, req, res, terminal)),
            ),
            None => terminal(req, res),
        }
    }
}

impl<B> Default for Pipeline<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> fmt::Debug for Pipeline<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
