//! Radix tree implementation of the data generator and matcher contracts
//!
//! The generator builds a radix tree (compact prefix tree) and serializes it
//! into [`DispatchData`]; the matcher deserializes it once and walks it per
//! request.
//!
//! ## Key Benefits
//!
//! - **O(k) Lookup**: Matching time is proportional to the number of path
//!   segments, not the number of routes
//! - **Memory Efficient**: Shared prefixes (e.g., `/api/v1/`) are stored only once
//! - **Deterministic**: Static children live in ordered maps and parameter
//!   children keep registration order, so the serialized tree is byte-identical
//!   for an identical route set
//!
//! ## Implementation Details
//!
//! - Each node represents a path segment
//! - Static segments (e.g., `users`) match exactly and are tried first
//! - Parameter segments (e.g., `{id}`) match any segment satisfying their
//!   optional constraint, tried in registration order with backtracking
//! - Routes are stored at terminal nodes, keyed by HTTP method
//! - `HEAD` falls back to the `GET` route of the same path

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::core::{
    DataGenerator, DispatchData, MatchOutcome, Matcher, ParamVec, ParsedRoute, Segment,
};
use crate::collector::HandlerKey;
use crate::error::RoutingError;

/// Format identifier written into dispatch data by [`RadixGenerator`]
pub const RADIX_GENERATOR: &str = "radix/v1";

/// Serialized node of the radix tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RadixNode {
    /// Route handlers terminating at this node, keyed by method name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    routes: BTreeMap<String, HandlerKey>,
    /// Static children keyed by segment
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, RadixNode>,
    /// Parameter children in registration order.
    /// Routes with different parameter names at the same position
    /// (e.g. /users/{id}/posts vs /users/{user_id}/comments) get their own child.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ParamChild {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constraint: Option<String>,
    node: RadixNode,
}

impl RadixNode {
    /// Insert a route into the tree
    fn insert(&mut self, segments: &[Segment], route: &ParsedRoute) -> Result<(), RoutingError> {
        let Some((segment, remaining)) = segments.split_first() else {
            let method = route.method.as_str().to_string();
            if let Some(existing) = self.routes.get(&method) {
                if existing != &route.handler {
                    return Err(RoutingError::compile(format!(
                        "cannot register two routes matching '{}' for method '{}'",
                        route.pattern, method
                    )));
                }
                // same pattern reached twice through optional parts
                return Ok(());
            }
            self.routes.insert(method, route.handler.clone());
            return Ok(());
        };

        match segment {
            Segment::Static(s) => self
                .children
                .entry(s.clone())
                .or_default()
                .insert(remaining, route),
            Segment::Param { name, constraint } => {
                // Look for an existing param child with the same name and constraint
                if let Some(child) = self
                    .params
                    .iter_mut()
                    .find(|p| &p.name == name && &p.constraint == constraint)
                {
                    return child.node.insert(remaining, route);
                }
                let mut child = ParamChild {
                    name: name.clone(),
                    constraint: constraint.clone(),
                    node: RadixNode::default(),
                };
                child.node.insert(remaining, route)?;
                self.params.push(child);
                Ok(())
            }
        }
    }
}

/// Segment signature with placeholder names erased.
///
/// Two routes with the same signature match exactly the same paths.
fn shape_of(segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Static(s) => s.clone(),
            Segment::Param { constraint, .. } => {
                format!("{{:{}}}", constraint.as_deref().unwrap_or_default())
            }
        })
        .collect()
}

/// Data generator producing a serialized radix tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadixGenerator;

impl RadixGenerator {
    /// Create a generator
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DataGenerator for RadixGenerator {
    fn generate(&self, routes: &[ParsedRoute]) -> Result<DispatchData, RoutingError> {
        let mut root = RadixNode::default();
        let mut shapes: HashMap<(&str, Vec<String>), &ParsedRoute> = HashMap::new();
        for route in routes {
            let shape = (route.method.as_str(), shape_of(&route.segments));
            if let Some(existing) = shapes.get(&shape) {
                if existing.handler != route.handler {
                    return Err(RoutingError::compile(format!(
                        "cannot register two routes matching '{}' for method '{}': '{}' already uses this shape",
                        route.pattern, route.method, existing.pattern
                    )));
                }
                // same shape and handler, e.g. reached twice through optional parts
                continue;
            }
            shapes.insert(shape, route);
            root.insert(&route.segments, route)?;
        }
        let payload = serde_json::to_value(&root)
            .map_err(|e| RoutingError::compile(format!("cannot serialize radix tree: {e}")))?;
        Ok(DispatchData {
            generator: RADIX_GENERATOR.to_string(),
            payload,
        })
    }
}

/// Runtime node: the serialized node with parameter constraints compiled
struct CompiledNode {
    routes: BTreeMap<String, HandlerKey>,
    children: BTreeMap<String, CompiledNode>,
    params: Vec<CompiledParam>,
}

struct CompiledParam {
    name: Arc<str>,
    constraint: Option<Regex>,
    node: CompiledNode,
}

impl CompiledNode {
    fn compile(node: RadixNode) -> Result<Self, RoutingError> {
        let children = node
            .children
            .into_iter()
            .map(|(seg, child)| Ok((seg, CompiledNode::compile(child)?)))
            .collect::<Result<_, RoutingError>>()?;
        let params = node
            .params
            .into_iter()
            .map(|p| {
                let constraint = p
                    .constraint
                    .as_deref()
                    .map(|c| Regex::new(&format!("^(?:{c})$")))
                    .transpose()
                    .map_err(|e| {
                        RoutingError::compile(format!("invalid constraint for '{}': {e}", p.name))
                    })?;
                Ok(CompiledParam {
                    name: Arc::from(p.name.as_str()),
                    constraint,
                    node: CompiledNode::compile(p.node)?,
                })
            })
            .collect::<Result<_, RoutingError>>()?;
        Ok(Self {
            routes: node.routes,
            children,
            params,
        })
    }

    /// Search for a route for `method`, filling `params` on the way down
    fn search(&self, segments: &[&str], method: &str, params: &mut ParamVec) -> Option<&HandlerKey> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(method);
        };

        // First, try exact match with static children
        if let Some(child) = self.children.get(*segment) {
            if let Some(found) = child.search(remaining, method, params) {
                return Some(found);
            }
        }

        // If no exact match, try all parameter children
        for param in &self.params {
            if !param.accepts(segment) {
                continue;
            }
            params.push((Arc::clone(&param.name), (*segment).to_string()));
            if let Some(found) = param.node.search(remaining, method, params) {
                return Some(found);
            }
            // Backtrack: remove the parameter if the search fails
            params.pop();
        }

        None
    }

    /// Collect every method registered on a node matching `segments`
    fn allowed(&self, segments: &[&str], out: &mut BTreeSet<String>) {
        let Some((segment, remaining)) = segments.split_first() else {
            out.extend(self.routes.keys().cloned());
            return;
        };
        if let Some(child) = self.children.get(*segment) {
            child.allowed(remaining, out);
        }
        for param in &self.params {
            if param.accepts(segment) {
                param.node.allowed(remaining, out);
            }
        }
    }
}

impl CompiledParam {
    fn accepts(&self, segment: &str) -> bool {
        self.constraint
            .as_ref()
            .map_or(true, |re| re.is_match(segment))
    }
}

/// Matcher walking a radix tree produced by [`RadixGenerator`].
pub struct RadixMatcher {
    root: CompiledNode,
}

impl RadixMatcher {
    /// Build a matcher from dispatch data.
    ///
    /// Fails when the data was produced by another generator or its payload
    /// is not a radix tree.
    pub fn from_dispatch_data(data: &DispatchData) -> Result<Self, RoutingError> {
        if data.generator != RADIX_GENERATOR {
            return Err(RoutingError::compile(format!(
                "dispatch data produced by '{}' cannot be read by the radix matcher",
                data.generator
            )));
        }
        let tree: RadixNode = serde_json::from_value(data.payload.clone())
            .map_err(|e| RoutingError::compile(format!("malformed radix dispatch data: {e}")))?;
        Ok(Self {
            root: CompiledNode::compile(tree)?,
        })
    }

    /// Dispatcher factory for [`crate::config::RoutingConfigBuilder::dispatcher`].
    ///
    /// Returns `None` (a configuration error) when the data cannot be read.
    #[must_use]
    pub fn factory() -> crate::config::DispatcherFactory {
        Arc::new(|data: &DispatchData| match RadixMatcher::from_dispatch_data(data) {
            Ok(m) => Some(Arc::new(m) as Arc<dyn Matcher>),
            Err(e) => {
                warn!(error = %e, "Radix matcher could not be built from dispatch data");
                None
            }
        })
    }
}

impl Matcher for RadixMatcher {
    fn lookup(&self, method: &Method, path: &str) -> MatchOutcome {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut params = ParamVec::new();
        if let Some(handler) = self.root.search(&segments, method.as_str(), &mut params) {
            return MatchOutcome::Found {
                handler: handler.clone(),
                params,
            };
        }
        if method == Method::HEAD {
            params.clear();
            if let Some(handler) = self.root.search(&segments, Method::GET.as_str(), &mut params) {
                return MatchOutcome::Found {
                    handler: handler.clone(),
                    params,
                };
            }
        }

        let mut allowed = BTreeSet::new();
        self.root.allowed(&segments, &mut allowed);
        if allowed.is_empty() {
            return MatchOutcome::NotFound;
        }
        MatchOutcome::MethodNotAllowed(
            allowed
                .into_iter()
                .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
                .collect(),
        )
    }
}
