//! Standard route-pattern parser.
//!
//! Grammar:
//!
//! - segments are separated by `/`; empty segments are ignored
//! - `{name}` is a placeholder matching one whole segment
//! - `{name:regex}` constrains the placeholder; the regex must match the whole
//!   segment
//! - `[...]` marks an optional trailing part; optional parts may nest
//!   (`/archive[/{year}[/{month}]]`) but must close at the end of the pattern

use regex::Regex;

use super::core::{RouteParser, Segment};
use crate::error::RoutingError;

/// Parser for `/users/{id:\d+}[/{slug}]` style patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdParser;

impl StdParser {
    /// Create a parser
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Split a pattern into its mandatory base and its nested optional parts.
    ///
    /// `/a[/b[/c]]` gives `["/a", "/b", "/c"]`.
    fn split_optional(pattern: &str) -> Result<Vec<&str>, RoutingError> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        let mut opened = 0usize;
        let mut closing_from: Option<usize> = None;

        for (idx, ch) in pattern.char_indices() {
            if closing_from.is_some() && ch != ']' {
                return Err(RoutingError::compile(format!(
                    "optional segments can only occur at the end of route '{pattern}'"
                )));
            }
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        RoutingError::compile(format!("unbalanced '}}' in route '{pattern}'"))
                    })?;
                }
                '[' if depth == 0 => {
                    parts.push(&pattern[start..idx]);
                    start = idx + 1;
                    opened += 1;
                }
                ']' if depth == 0 => {
                    if closing_from.is_none() {
                        parts.push(&pattern[start..idx]);
                        closing_from = Some(idx);
                    }
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err(RoutingError::compile(format!(
                "unbalanced '{{' in route '{pattern}'"
            )));
        }

        match closing_from {
            None if opened == 0 => parts.push(&pattern[start..]),
            None => {
                return Err(RoutingError::compile(format!(
                    "number of opening '[' and closing ']' does not match in route '{pattern}'"
                )))
            }
            Some(from) => {
                let closed = pattern[from..].chars().filter(|c| *c == ']').count();
                if closed != opened {
                    return Err(RoutingError::compile(format!(
                        "number of opening '[' and closing ']' does not match in route '{pattern}'"
                    )));
                }
            }
        }

        if parts.iter().skip(1).any(|p| p.is_empty()) {
            return Err(RoutingError::compile(format!(
                "empty optional part in route '{pattern}'"
            )));
        }
        Ok(parts)
    }

    fn parse_segment(raw: &str, pattern: &str) -> Result<Segment, RoutingError> {
        let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            if raw.contains('{') || raw.contains('}') {
                return Err(RoutingError::compile(format!(
                    "placeholder must span a whole segment: '{raw}' in route '{pattern}'"
                )));
            }
            return Ok(Segment::Static(raw.to_string()));
        };

        let (name, constraint) = match inner.split_once(':') {
            Some((name, c)) => (name.trim(), Some(c.trim())),
            None => (inner.trim(), None),
        };

        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(RoutingError::compile(format!(
                "invalid placeholder name '{name}' in route '{pattern}'"
            )));
        }

        let constraint = match constraint {
            Some("") => {
                return Err(RoutingError::compile(format!(
                    "empty constraint for placeholder '{name}' in route '{pattern}'"
                )))
            }
            Some(c) => {
                Regex::new(&format!("^(?:{c})$")).map_err(|e| {
                    RoutingError::compile(format!(
                        "invalid constraint for placeholder '{name}' in route '{pattern}': {e}"
                    ))
                })?;
                Some(c.to_string())
            }
            None => None,
        };

        Ok(Segment::Param {
            name: name.to_string(),
            constraint,
        })
    }

    /// Split on `/` outside of placeholders, dropping empty segments
    fn split_segments(path: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (idx, ch) in path.char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '/' if depth == 0 => {
                    if idx > start {
                        out.push(&path[start..idx]);
                    }
                    start = idx + 1;
                }
                _ => {}
            }
        }
        if path.len() > start {
            out.push(&path[start..]);
        }
        out
    }
}

impl RouteParser for StdParser {
    fn parse(&self, pattern: &str) -> Result<Vec<Vec<Segment>>, RoutingError> {
        let parts = Self::split_optional(pattern)?;

        let mut variants = Vec::with_capacity(parts.len());
        let mut current: Vec<Segment> = Vec::new();
        for part in parts {
            for raw in Self::split_segments(part) {
                current.push(Self::parse_segment(raw, pattern)?);
            }

            let mut seen = std::collections::HashSet::new();
            for seg in &current {
                if let Segment::Param { name, .. } = seg {
                    if !seen.insert(name.as_str()) {
                        return Err(RoutingError::compile(format!(
                            "cannot use the same placeholder '{name}' twice in route '{pattern}'"
                        )));
                    }
                }
            }
            variants.push(current.clone());
        }
        Ok(variants)
    }
}
