//! Collaborator contracts for route compilation and matching.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::collector::HandlerKey;
use crate::error::RoutingError;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have <= 4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the compiled route tree
/// and are cloned on every match; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One path segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Literal segment, matched exactly
    Static(String),
    /// Placeholder segment, optionally constrained by a regex
    Param {
        /// Placeholder name
        name: String,
        /// Regex the whole segment must match
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint: Option<String>,
    },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(s) => f.write_str(s),
            Segment::Param {
                name,
                constraint: None,
            } => write!(f, "{{{name}}}"),
            Segment::Param {
                name,
                constraint: Some(c),
            } => write!(f, "{{{name}:{c}}}"),
        }
    }
}

/// A route after pattern parsing, ready for data generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    /// HTTP method
    pub method: Method,
    /// Original pattern, for diagnostics
    pub pattern: String,
    /// Parsed path segments
    pub segments: Vec<Segment>,
    /// Handler the route dispatches to
    pub handler: HandlerKey,
}

/// Compiled, serializable form of a route table.
///
/// Opaque to the middleware: only the generator that produced it and the
/// matcher built from it understand `payload`. `generator` names the format
/// so a matcher can refuse data it cannot read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchData {
    /// Format identifier of the producing generator
    pub generator: String,
    /// Generator-specific structure
    pub payload: Value,
}

impl DispatchData {
    /// Serialize for storage. Deterministic for identical data.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from stored bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Raw result of a matcher lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A route matched the method and path
    Found {
        /// Handler of the matched route
        handler: HandlerKey,
        /// Path parameters as they appear in the path (not decoded)
        params: ParamVec,
    },
    /// No route matches the path
    NotFound,
    /// The path matches routes registered for other methods only
    MethodNotAllowed(Vec<Method>),
}

/// Route-pattern parsing capability.
pub trait RouteParser: Send + Sync {
    /// Parse a pattern into one segment list per variant.
    ///
    /// Patterns with optional parts produce several variants, shortest first.
    fn parse(&self, pattern: &str) -> Result<Vec<Vec<Segment>>, RoutingError>;
}

/// Dispatch-data generation capability.
///
/// Must be a pure function of its input: the same routes in the same order
/// produce byte-identical dispatch data.
pub trait DataGenerator: Send + Sync {
    /// Build dispatch data from parsed routes
    fn generate(&self, routes: &[ParsedRoute]) -> Result<DispatchData, RoutingError>;
}

/// Matching capability, built from dispatch data by the dispatcher factory.
pub trait Matcher: Send + Sync {
    /// Look up a normalized path for a method
    fn lookup(&self, method: &Method, path: &str) -> MatchOutcome;
}
