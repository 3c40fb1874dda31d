//! # routekit
//!
//! **routekit** is an HTTP request-routing middleware: it compiles a declarative
//! route table into cacheable dispatch data, matches each request's method and
//! path against it, resolves the handler (an inline closure or a late-bound
//! `"Class:method"` reference) and returns the handler's validated response.
//!
//! ## Overview
//!
//! routekit is transport-agnostic. Requests and responses are the `http`
//! crate's [`http::Request<B>`] and [`http::Response<B>`], generic over the
//! body type, so the middleware slots into any server that can produce them.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`collector`]** - Route registration (`RouteCollector`, groups, handler references)
//! - **[`router`]** - Parser, data generator and matcher contracts, plus a radix tree implementation
//! - **[`compiler`]** - Route table compilation into [`router::DispatchData`]
//! - **[`cache`]** - Cache drivers and the load-or-compile layer
//! - **[`dispatcher`]** - Path normalization and match outcome translation
//! - **[`handlers`]** - Handler types, controller registry and handler resolution
//! - **[`validator`]** - Handler invocation and response contract validation
//! - **[`middleware`]** - The [`Middleware`] contract, [`middleware::Pipeline`] and the [`Routing`] facade
//! - **[`config`]** / **[`runtime_config`]** - Typed configuration and environment/YAML settings
//! - **[`logging`]** - `tracing-subscriber` initialization
//! - **[`cli`]** - The `routekit-cache` operator commands
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Chain as Outer Chain
//!     participant Routing as Routing
//!     participant Adapter as DispatcherAdapter
//!     participant Resolver as HandlerResolver
//!     participant Invoker as Invoker
//!     participant Next as next
//!
//!     Chain->>Routing: handle(request, response, next)
//!     Routing->>Adapter: match_request(method, path)
//!     alt No route
//!         Adapter-->>Routing: NotFound
//!         Routing-->>Chain: RouteNotFound (or Next when delegating)
//!     else Other methods only
//!         Adapter-->>Routing: MethodNotAllowed{allowed}
//!         Routing-->>Chain: MethodNotAllowed
//!     else Match
//!         Adapter-->>Routing: Found{handler, params}
//!         Routing->>Resolver: resolve(handler)
//!         Resolver-->>Routing: ResolvedHandler
//!         Routing->>Invoker: invoke(handler, request, response, params)
//!         Invoker-->>Routing: validated Response
//!         Routing-->>Chain: Response
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Method, Request, Response, StatusCode};
//! use routekit::handlers::{ActionTable, Controller, ControllerRegistry, Reply};
//! use routekit::{handler, Routing, RoutingConfig, RoutingError};
//!
//! #[derive(Default)]
//! struct Users;
//!
//! impl Controller<String> for Users {
//!     fn actions() -> ActionTable<Self, String> {
//!         ActionTable::new().action("show", |_users, _req, mut res, params| {
//!             *res.body_mut() = format!("user {}", params[0].1);
//!             Reply::Response(res)
//!         })
//!     }
//! }
//!
//! let mut controllers = ControllerRegistry::<String>::new();
//! controllers.register::<Users>("Users");
//!
//! let config = RoutingConfig::standard(|routes| {
//!     routes.get("/", handler(|_req, res: Response<String>, _params| res));
//!     routes.add_group("/users", |users| {
//!         users.get("/{id:\\d+}", "Users:show");
//!     });
//! })
//! .controllers(controllers)
//! .build()?;
//! let routing = Routing::new(config)?;
//!
//! let req = Request::get("/users/7").body(String::new()).unwrap();
//! let res = routing.dispatch(&req, Response::new(String::new()))?;
//! assert_eq!(res.body(), "user 7");
//!
//! let req = Request::post("/").body(String::new()).unwrap();
//! let err = routing.dispatch(&req, Response::new(String::new())).unwrap_err();
//! assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert!(matches!(err, RoutingError::MethodNotAllowed { ref allowed, .. } if allowed == &[Method::GET]));
//! # Ok::<(), RoutingError>(())
//! ```
//!
//! ## Caching
//!
//! With `cache(true)` and a [`cache::CacheDriver`], the compiled table is stored
//! under `routekit.routes:<fingerprint>`, where the fingerprint is derived from
//! the registered routes. Later constructions with the same routes skip
//! parsing and generation entirely; a changed table gets a new key.

pub mod cache;
pub mod cli;
pub mod collector;
pub mod compiler;
pub mod config;
pub mod dispatcher;
mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod validator;

pub use collector::{HandlerRef, RouteCollector};
pub use config::{Fallthrough, RoutingConfig, RoutingConfigBuilder};
pub use error::{CacheError, RoutingError};
pub use handlers::{handler, Reply};
pub use middleware::{Middleware, Routing};
