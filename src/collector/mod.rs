//! # Collector Module
//!
//! Route registration. A configuration closure receives a [`RouteCollector`]
//! and registers `(method, pattern, handler)` triples on it; the collector
//! turns them into a [`RouteSet`], the input of the [`crate::compiler::Compiler`].
//!
//! ## Handler references
//!
//! A handler is either an inline closure (see [`crate::handler`]) or a
//! deferred `"Class:method"` string resolved against the
//! [`crate::handlers::ControllerRegistry`] at dispatch time:
//!
//! ```rust
//! use routekit::{handler, RouteCollector};
//!
//! let mut routes = RouteCollector::<String>::new();
//! routes.get("/", handler(|_req, res, _params| res));
//! routes.add_route(["GET", "POST"], "/articles/{id:\\d+}", "ArticleController:show");
//! routes.add_group("/admin", |admin| {
//!     admin.get("/users", "AdminController:users");
//! });
//!
//! let set = routes.into_route_set().unwrap();
//! assert_eq!(set.len(), 4);
//! ```
//!
//! Inline closures cannot be serialized into dispatch data, so each one is
//! stored in a handler table and referenced by position
//! ([`HandlerKey::Inline`]). Registration order is deterministic, which keeps
//! compiled dispatch data identical across process starts.

mod core;

pub use core::{HandlerKey, HandlerRef, IntoHandlerRef, IntoMethods, RouteCollector, RouteDefinition, RouteEntry, RouteSet};
