//! Error types for routing operations
//!
//! Every failure the middleware can produce is a variant of [`RoutingError`].
//! Variants are one-shot: nothing in this crate retries. The boundary layer
//! picks a transport status with [`RoutingError::status`].
//!
//! # Example
//! ```rust
//! use routekit::RoutingError;
//! use http::{Method, StatusCode};
//!
//! let err = RoutingError::MethodNotAllowed {
//!     method: Method::POST,
//!     path: "/".to_string(),
//!     allowed: vec![Method::GET, Method::HEAD],
//! };
//! assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert_eq!(err.allow_header().as_deref(), Some("GET, HEAD"));
//! ```

use http::{Method, StatusCode};
use thiserror::Error;

/// Failure of the persistent store behind a [`crate::cache::CacheDriver`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying store could not be read or written
    #[error("cache I/O failure for key '{key}': {source}")]
    Io {
        /// Cache key being accessed
        key: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The stored bytes are not valid dispatch data
    #[error("corrupt cache entry '{key}': {reason}")]
    Corrupt {
        /// Cache key holding the bad entry
        key: String,
        /// Decoder message
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }
}

/// Error taxonomy of the routing middleware.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A required collaborator is missing or invalid. Raised while building the
    /// middleware, never while serving a request.
    #[error("invalid routing configuration: {0}")]
    Configuration(String),

    /// The route table could not be compiled into dispatch data
    #[error("route table compilation failed: {0}")]
    Compile(String),

    /// No route matches the request path
    #[error("no route found for {method} {path}")]
    RouteNotFound {
        /// Request method
        method: Method,
        /// Normalized request path
        path: String,
    },

    /// The path matches but not for this method
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// Request method
        method: Method,
        /// Normalized request path
        path: String,
        /// Methods registered for the path, sorted
        allowed: Vec<Method>,
    },

    /// A deferred `Class:method` reference could not be turned into a handler
    #[error("cannot resolve handler '{handler}': {reason}")]
    HandlerResolution {
        /// The handler reference as registered
        handler: String,
        /// Why resolution failed
        reason: String,
    },

    /// A handler returned something that is not a response
    #[error("handler '{handler}' returned an invalid response: {reason}")]
    InvalidResponse {
        /// Handler label
        handler: String,
        /// What was wrong with the reply
        reason: String,
    },

    /// The route cache could not be read or written
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RoutingError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// HTTP status a boundary layer should answer with for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Configuration(_)
            | Self::Compile(_)
            | Self::HandlerResolution { .. }
            | Self::InvalidResponse { .. }
            | Self::Cache(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value for the `Allow` header when the error is `MethodNotAllowed`.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            Self::MethodNotAllowed { allowed, .. } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }

    /// True for the "nothing matched" kinds a chain may recover from.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}
