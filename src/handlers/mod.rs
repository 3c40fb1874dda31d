//! # Handlers Module
//!
//! Handler types and late-bound handler resolution.
//!
//! ## Overview
//!
//! A route handler is either a closure registered inline (see
//! [`crate::handler`]) or a deferred `"Class:method"` string. Deferred
//! references are resolved at dispatch time through a [`ControllerRegistry`]
//! filled at startup: each class name maps to a typed factory, and each
//! [`Controller`] publishes its actions in an [`ActionTable`]. There is no
//! reflection; a name that is not in the registry is a
//! [`crate::RoutingError::HandlerResolution`].
//!
//! ## Example
//!
//! ```rust
//! use routekit::collector::HandlerKey;
//! use routekit::handlers::{ActionTable, Controller, ControllerRegistry, HandlerResolver, Reply};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Pets;
//!
//! impl Controller<String> for Pets {
//!     fn actions() -> ActionTable<Self, String> {
//!         ActionTable::new().action("list", |_pets, _req, res, _params| Reply::Response(res))
//!     }
//! }
//!
//! let mut registry = ControllerRegistry::<String>::new();
//! registry.register::<Pets>("Pets");
//!
//! let resolver = HandlerResolver::new(Arc::new(registry), Vec::new());
//! let key = HandlerKey::Deferred { class: "Pets".into(), method: "list".into() };
//! assert_eq!(resolver.resolve(&key).unwrap().label(), "Pets:list");
//! ```

mod registry;
mod resolver;
mod types;

pub use registry::{Action, ActionTable, Controller, ControllerRegistry};
pub use resolver::{HandlerResolver, ResolvedHandler};
pub use types::{handler, HandlerFn, Reply};
