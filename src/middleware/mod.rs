//! # Middleware Module
//!
//! The [`Middleware`] contract, a [`Pipeline`] to chain stages, and the
//! [`Routing`] facade that ties collection, compilation, caching, matching,
//! handler resolution and invocation together.
//!
//! ## Request Lifecycle
//!
//! 1. The route table was compiled (or loaded from the cache) when the
//!    [`Routing`] instance was built
//! 2. The dispatcher adapter matches the method and normalized path
//! 3. No match: [`crate::RoutingError::RouteNotFound`], or the `next` stage
//!    when the fallthrough policy is [`crate::config::Fallthrough::Delegate`]
//! 4. Path matched for other methods only:
//!    [`crate::RoutingError::MethodNotAllowed`]
//! 5. Match: the handler is resolved, invoked and its reply validated
//!
//! A matched route never calls `next`.
//!
//! ## Example
//!
//! ```rust
//! use http::{Request, Response, StatusCode};
//! use routekit::middleware::{Middleware, Routing};
//! use routekit::{handler, RoutingConfig};
//!
//! let routing = Routing::new(
//!     RoutingConfig::standard(|routes| {
//!         routes.get("/hello/{name}", handler(|_req, mut res: Response<String>, params| {
//!             *res.body_mut() = format!("hello {}", params[0].1);
//!             res
//!         }));
//!     })
//!     .build()
//!     .unwrap(),
//! )
//! .unwrap();
//!
//! let req = Request::get("/hello/world").body(String::new()).unwrap();
//! let res = routing
//!     .handle(req, Response::new(String::new()), Box::new(|_req, res| Ok(res)))
//!     .unwrap();
//! assert_eq!(res.status(), StatusCode::OK);
//! assert_eq!(res.body(), "hello world");
//! ```

mod core;
mod routing;
mod tracing;

pub use core::{Middleware, Next, Pipeline};
pub use routing::Routing;
pub use tracing::TracingMiddleware;
