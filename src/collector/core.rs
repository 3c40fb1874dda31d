use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::handlers::HandlerFn;

/// Handler reference as registered by the configuration closure.
///
/// Exactly one variant is populated: an inline callable, or a deferred
/// `Class:method` pair resolved lazily at dispatch time.
pub enum HandlerRef<B> {
    /// Callable closed over at registration time
    Callable(HandlerFn<B>),
    /// Late-bound controller action
    Deferred {
        /// Registered controller name
        class: String,
        /// Action name on that controller
        method: String,
    },
}

impl<B> HandlerRef<B> {
    /// Parse a `"<Class>:<method>"` reference.
    ///
    /// Exactly one colon is allowed and both sides must be non-empty.
    pub fn deferred(reference: &str) -> Result<Self, String> {
        let invalid = || format!("handler '{reference}' is not of the form 'Class:method'");
        let (class, method) = reference.split_once(':').ok_or_else(invalid)?;
        let (class, method) = (class.trim(), method.trim());
        if class.is_empty() || method.is_empty() || method.contains(':') {
            return Err(invalid());
        }
        Ok(HandlerRef::Deferred {
            class: class.to_string(),
            method: method.to_string(),
        })
    }

    /// True when the reference is an inline callable
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, HandlerRef::Callable(_))
    }
}

impl<B> Clone for HandlerRef<B> {
    fn clone(&self) -> Self {
        match self {
            HandlerRef::Callable(f) => HandlerRef::Callable(Arc::clone(f)),
            HandlerRef::Deferred { class, method } => HandlerRef::Deferred {
                class: class.clone(),
                method: method.clone(),
            },
        }
    }
}

impl<B> fmt::Debug for HandlerRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Callable(_) => f.write_str("HandlerRef::Callable(..)"),
            HandlerRef::Deferred { class, method } => write!(f, "HandlerRef::Deferred({class}:{method})"),
        }
    }
}

/// Anything a route can be registered with.
///
/// Implemented for `&str` / `String` (deferred references) and
/// [`HandlerRef`] itself (use [`crate::handler`] for closures).
pub trait IntoHandlerRef<B> {
    /// Convert into a handler reference, or describe why it is not one
    fn into_handler_ref(self) -> Result<HandlerRef<B>, String>;
}

impl<B> IntoHandlerRef<B> for HandlerRef<B> {
    fn into_handler_ref(self) -> Result<HandlerRef<B>, String> {
        Ok(self)
    }
}

impl<B> IntoHandlerRef<B> for &str {
    fn into_handler_ref(self) -> Result<HandlerRef<B>, String> {
        HandlerRef::deferred(self)
    }
}

impl<B> IntoHandlerRef<B> for String {
    fn into_handler_ref(self) -> Result<HandlerRef<B>, String> {
        HandlerRef::deferred(&self)
    }
}

/// One or more HTTP methods for a registration.
pub trait IntoMethods {
    /// Convert into a list of methods, or describe the invalid token
    fn into_methods(self) -> Result<Vec<Method>, String>;
}

fn parse_method(token: &str) -> Result<Method, String> {
    let upper = token.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err("empty HTTP method".to_string());
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| format!("invalid HTTP method '{token}'"))
}

impl IntoMethods for Method {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        Ok(vec![self])
    }
}

impl IntoMethods for &str {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        Ok(vec![parse_method(self)?])
    }
}

impl IntoMethods for &[&str] {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        self.iter().map(|m| parse_method(m)).collect()
    }
}

impl<const N: usize> IntoMethods for [&str; N] {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        self.iter().map(|m| parse_method(m)).collect()
    }
}

impl IntoMethods for Vec<&str> {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        self.iter().map(|m| parse_method(m)).collect()
    }
}

impl<const N: usize> IntoMethods for [Method; N] {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        Ok(self.to_vec())
    }
}

impl IntoMethods for Vec<Method> {
    fn into_methods(self) -> Result<Vec<Method>, String> {
        Ok(self)
    }
}

/// A single `(method, pattern, handler)` registration.
pub struct RouteDefinition<B> {
    /// HTTP method
    pub method: Method,
    /// Path pattern, group prefixes applied
    pub pattern: String,
    /// Handler reference
    pub handler: HandlerRef<B>,
}

impl<B> fmt::Debug for RouteDefinition<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler)
            .finish()
    }
}

/// Serializable projection of a [`HandlerRef`], stored in dispatch data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKey {
    /// Position in the route set's handler table
    Inline(usize),
    /// Late-bound controller action
    Deferred {
        /// Registered controller name
        class: String,
        /// Action name
        method: String,
    },
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKey::Inline(idx) => write!(f, "closure#{idx}"),
            HandlerKey::Deferred { class, method } => write!(f, "{class}:{method}"),
        }
    }
}

/// A collected route with its handler projected to a [`HandlerKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// HTTP method
    pub method: Method,
    /// Path pattern
    pub pattern: String,
    /// Serializable handler reference
    pub handler: HandlerKey,
}

/// Route definitions registered by the configuration closure.
///
/// Collects registrations and remembers grammar violations (invalid method
/// tokens, malformed `Class:method` strings) so they can be reported as a
/// configuration error once the closure returns.
pub struct RouteCollector<B> {
    prefix: String,
    definitions: Vec<RouteDefinition<B>>,
    errors: Vec<String>,
}

impl<B> Default for RouteCollector<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> RouteCollector<B> {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            definitions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Register a handler for one or more methods on a path pattern.
    pub fn add_route<M, H>(&mut self, methods: M, pattern: &str, handler: H) -> &mut Self
    where
        M: IntoMethods,
        H: IntoHandlerRef<B>,
    {
        let pattern = format!("{}{}", self.prefix, pattern);
        let methods = match methods.into_methods() {
            Ok(methods) if !methods.is_empty() => methods,
            Ok(_) => {
                self.reject(&pattern, "no HTTP method given".to_string());
                return self;
            }
            Err(e) => {
                self.reject(&pattern, e);
                return self;
            }
        };
        let handler = match handler.into_handler_ref() {
            Ok(h) => h,
            Err(e) => {
                self.reject(&pattern, e);
                return self;
            }
        };

        for method in methods {
            debug!(method = %method, pattern = %pattern, handler = ?handler, "Route registered");
            self.definitions.push(RouteDefinition {
                method,
                pattern: pattern.clone(),
                handler: handler.clone(),
            });
        }
        self
    }

    /// Register all routes added inside `f` under a common path prefix.
    pub fn add_group<F>(&mut self, prefix: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut RouteCollector<B>),
    {
        let previous = self.prefix.clone();
        self.prefix.push_str(prefix);
        f(self);
        self.prefix = previous;
        self
    }

    /// Shorthand for `add_route(Method::GET, ..)`
    pub fn get<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::GET, pattern, handler)
    }

    /// Shorthand for `add_route(Method::POST, ..)`
    pub fn post<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Shorthand for `add_route(Method::PUT, ..)`
    pub fn put<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// Shorthand for `add_route(Method::PATCH, ..)`
    pub fn patch<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// Shorthand for `add_route(Method::DELETE, ..)`
    pub fn delete<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// Shorthand for `add_route(Method::HEAD, ..)`
    pub fn head<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::HEAD, pattern, handler)
    }

    /// Shorthand for `add_route(Method::OPTIONS, ..)`
    pub fn options<H: IntoHandlerRef<B>>(&mut self, pattern: &str, handler: H) -> &mut Self {
        self.add_route(Method::OPTIONS, pattern, handler)
    }

    /// Definitions registered so far
    #[must_use]
    pub fn definitions(&self) -> &[RouteDefinition<B>] {
        &self.definitions
    }

    fn reject(&mut self, pattern: &str, reason: String) {
        warn!(pattern = %pattern, reason = %reason, "Route registration rejected");
        self.errors.push(format!("{pattern}: {reason}"));
    }

    /// Finish collection.
    ///
    /// Fails with [`RoutingError::Configuration`] if any registration was
    /// rejected.
    pub fn into_route_set(self) -> Result<RouteSet<B>, RoutingError> {
        if !self.errors.is_empty() {
            return Err(RoutingError::config(format!(
                "invalid route registration: {}",
                self.errors.join("; ")
            )));
        }

        let mut handlers = Vec::new();
        let routes = self
            .definitions
            .into_iter()
            .map(|def| {
                let handler = match def.handler {
                    HandlerRef::Callable(f) => {
                        handlers.push(f);
                        HandlerKey::Inline(handlers.len() - 1)
                    }
                    HandlerRef::Deferred { class, method } => HandlerKey::Deferred { class, method },
                };
                RouteEntry {
                    method: def.method,
                    pattern: def.pattern,
                    handler,
                }
            })
            .collect();

        Ok(RouteSet { routes, handlers })
    }
}

/// Collected route table: entries in registration order plus the table of
/// inline handlers they reference.
pub struct RouteSet<B> {
    routes: Vec<RouteEntry>,
    handlers: Vec<HandlerFn<B>>,
}

impl<B> RouteSet<B> {
    /// Route entries in registration order
    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Number of route entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when nothing was registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Content fingerprint of the route table.
    ///
    /// First 16 hex characters of the SHA-256 over the canonical
    /// `METHOD pattern handler` listing. Identical registrations always give
    /// the same fingerprint; any change to a method, pattern or handler
    /// reference gives a different one.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for route in &self.routes {
            hasher.update(route.method.as_str().as_bytes());
            hasher.update(b" ");
            hasher.update(route.pattern.as_bytes());
            hasher.update(b" ");
            hasher.update(route.handler.to_string().as_bytes());
            hasher.update(b"\n");
        }
        let hash = format!("{:x}", hasher.finalize());
        hash.chars().take(16).collect()
    }

    /// Drop the route entries, keeping the inline handler table
    #[must_use]
    pub fn into_handlers(self) -> Vec<HandlerFn<B>> {
        self.handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler;

    fn collect<F: FnOnce(&mut RouteCollector<String>)>(f: F) -> Result<RouteSet<String>, RoutingError> {
        let mut c = RouteCollector::new();
        f(&mut c);
        c.into_route_set()
    }

    #[test]
    fn test_deferred_reference_parsing() {
        match HandlerRef::<String>::deferred("ControllerStub:handleRequest").unwrap() {
            HandlerRef::Deferred { class, method } => {
                assert_eq!(class, "ControllerStub");
                assert_eq!(method, "handleRequest");
            }
            HandlerRef::Callable(_) => panic!("expected deferred reference"),
        }

        for bad in [
            "NoColon",
            ":method",
            "Class:",
            "a::b",
            "  :  ",
            "a:b:c",
            "Stub:handle:extra",
            "app::stub::ControllerStub:show",
        ] {
            assert!(HandlerRef::<String>::deferred(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_multiple_methods_expand() {
        let set = collect(|c| {
            c.add_route(["get", "POST"], "/items", "Items:save");
        })
        .unwrap();
        let methods: Vec<_> = set.routes().iter().map(|r| r.method.clone()).collect();
        assert_eq!(methods, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_group_prefix_applies_and_restores() {
        let set = collect(|c| {
            c.add_group("/admin", |a| {
                a.get("/users", "Admin:users");
                a.add_group("/deep", |d| {
                    d.get("/x", "Admin:x");
                });
            });
            c.get("/public", "Public:index");
        })
        .unwrap();
        let patterns: Vec<_> = set.routes().iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/admin/users", "/admin/deep/x", "/public"]);
    }

    #[test]
    fn test_inline_handlers_are_indexed_in_order() {
        let set = collect(|c| {
            c.get("/", handler(|_req, res, _p| res));
            c.get("/deferred", "Stub:handle");
            c.post("/", handler(|_req, res, _p| res));
        })
        .unwrap();
        let keys: Vec<_> = set.routes().iter().map(|r| r.handler.clone()).collect();
        assert_eq!(keys[0], HandlerKey::Inline(0));
        assert_eq!(keys[2], HandlerKey::Inline(1));
        assert_eq!(set.into_handlers().len(), 2);
    }

    #[test]
    fn test_invalid_registrations_fail_collection() {
        let err = collect(|c| {
            c.get("/", "not-a-reference");
        })
        .err()
        .unwrap();
        assert!(matches!(err, RoutingError::Configuration(_)));

        let err = collect(|c| {
            c.add_route("BAD METHOD", "/", "Stub:handle");
        })
        .err()
        .unwrap();
        assert!(err.to_string().contains("invalid HTTP method"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = collect(|c| {
            c.get("/", "Stub:handle");
        })
        .unwrap();
        let b = collect(|c| {
            c.get("/", "Stub:handle");
        })
        .unwrap();
        let changed = collect(|c| {
            c.get("/home", "Stub:handle");
        })
        .unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);
        assert_ne!(a.fingerprint(), changed.fingerprint());
    }
}
