use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tracing::{debug, info, warn};

use crate::collector::HandlerKey;
use crate::router::{MatchOutcome, Matcher, ParamVec};

/// Matching slower than this is logged at `warn`
const SLOW_MATCH: Duration = Duration::from_millis(1);

/// Result of dispatching a `(method, path)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A route matched
    Found {
        /// Handler of the matched route
        handler: HandlerKey,
        /// Percent-decoded path parameters in pattern order
        params: ParamVec,
    },
    /// No route matches the path
    NotFound,
    /// The path matches only routes registered for other methods
    MethodNotAllowed {
        /// Registered methods for the path, sorted and deduplicated
        allowed: Vec<Method>,
    },
}

impl MatchResult {
    /// Short name of the outcome for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MatchResult::Found { .. } => "found",
            MatchResult::NotFound => "not_found",
            MatchResult::MethodNotAllowed { .. } => "method_not_allowed",
        }
    }
}

/// Normalize a request path for matching.
///
/// An empty path becomes `/` and runs of `/` collapse into one. Query and
/// fragment are never part of the input (`Uri::path` excludes them).
///
/// ```rust
/// use routekit::dispatcher::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("//users///42/"), "/users/42/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed("/");
    }
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Dispatches normalized `(method, path)` pairs to the configured matcher.
#[derive(Clone)]
pub struct DispatcherAdapter {
    matcher: Arc<dyn Matcher>,
}

impl DispatcherAdapter {
    /// Wrap a matcher built by the dispatcher factory
    pub fn new(matcher: Arc<dyn Matcher>) -> Self {
        Self { matcher }
    }

    /// Match a request method and raw path.
    pub fn match_request(&self, method: &Method, path: &str) -> MatchResult {
        let path = normalize_path(path);
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = std::time::Instant::now();
        let outcome = self.matcher.lookup(method, &path);
        let match_duration = match_start.elapsed();

        match outcome {
            MatchOutcome::Found { handler, params } => {
                let params = decode_params(params);
                if match_duration > SLOW_MATCH {
                    warn!(
                        method = %method,
                        path = %path,
                        handler = %handler,
                        path_params = ?params,
                        duration_us = match_duration.as_micros() as u64,
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        method = %method,
                        path = %path,
                        handler = %handler,
                        path_params = ?params,
                        duration_us = match_duration.as_micros() as u64,
                        "Route matched"
                    );
                }
                MatchResult::Found { handler, params }
            }
            MatchOutcome::MethodNotAllowed(mut allowed) => {
                allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                allowed.dedup();
                warn!(
                    method = %method,
                    path = %path,
                    allowed = ?allowed,
                    duration_us = match_duration.as_micros() as u64,
                    "Method not allowed"
                );
                MatchResult::MethodNotAllowed { allowed }
            }
            MatchOutcome::NotFound => {
                warn!(
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros() as u64,
                    "No route matched"
                );
                MatchResult::NotFound
            }
        }
    }
}

impl std::fmt::Debug for DispatcherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherAdapter").finish_non_exhaustive()
    }
}

/// Percent-decode parameter values; values that do not decode to UTF-8 are
/// kept as captured
fn decode_params(mut params: ParamVec) -> ParamVec {
    for (_, value) in params.iter_mut() {
        if !value.contains('%') {
            continue;
        }
        if let Ok(decoded) = urlencoding::decode(value) {
            *value = decoded.into_owned();
        }
    }
    params
}
