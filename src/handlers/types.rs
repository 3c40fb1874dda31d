use std::sync::Arc;

use http::{Request, Response};
use serde_json::Value;

use crate::router::ParamVec;

/// Type-erased handler callable: `(request, response, path params) -> reply`.
pub type HandlerFn<B> = Arc<dyn Fn(&Request<B>, Response<B>, &ParamVec) -> Reply<B> + Send + Sync>;

/// What a handler hands back to the middleware.
///
/// Handler bodies are arbitrary user code, so the reply is checked by
/// [`crate::validator::Invoker`] before it leaves the middleware. Only
/// [`Reply::Response`] with a final status satisfies the response contract.
#[derive(Debug)]
pub enum Reply<B> {
    /// A complete HTTP response
    Response(Response<B>),
    /// A bare JSON value (not a response)
    Value(Value),
    /// Nothing was returned
    Empty,
}

impl<B> Reply<B> {
    /// Short name of the variant, used in logs and error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Response(_) => "response",
            Reply::Value(_) => "value",
            Reply::Empty => "empty",
        }
    }
}

impl<B> From<Response<B>> for Reply<B> {
    fn from(res: Response<B>) -> Self {
        Reply::Response(res)
    }
}

impl<B> From<Value> for Reply<B> {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl<B> From<()> for Reply<B> {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

/// Wrap a closure as an inline route handler.
///
/// ```rust
/// use routekit::{handler, HandlerRef};
///
/// let h: HandlerRef<String> = handler(|_req, res, _params| res);
/// assert!(h.is_callable());
/// ```
pub fn handler<B, F, R>(f: F) -> crate::collector::HandlerRef<B>
where
    F: Fn(&Request<B>, Response<B>, &ParamVec) -> R + Send + Sync + 'static,
    R: Into<Reply<B>>,
{
    crate::collector::HandlerRef::Callable(Arc::new(move |req: &Request<B>, res: Response<B>, params: &ParamVec| {
        f(req, res, params).into()
    }))
}
