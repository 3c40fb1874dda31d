//! # Router Module
//!
//! The collaborator contracts the middleware orchestrates, plus one reference
//! implementation of them.
//!
//! ## Overview
//!
//! Matching is split into three pluggable pieces:
//!
//! - [`RouteParser`] turns a pattern such as `/users/{id:\d+}[/{slug}]` into one
//!   or more lists of [`Segment`]s
//! - [`DataGenerator`] turns all parsed routes into [`DispatchData`], an opaque,
//!   serializable and deterministic artifact that can be cached
//! - [`Matcher`] is built from dispatch data by the configured dispatcher
//!   factory and answers `(method, path)` lookups with a [`MatchOutcome`]
//!
//! ## Architecture
//!
//! The reference implementation uses a two-phase approach:
//!
//! 1. **Compilation**: [`StdParser`] + [`RadixGenerator`] build a radix tree
//!    (static children in ordered maps, parameter children in registration
//!    order) and serialize it to JSON.
//!
//! 2. **Matching**: [`RadixMatcher`] deserializes the tree once, compiles the
//!    parameter constraints to regexes, and walks it per request, static
//!    children first, backtracking through parameter children.
//!
//! ## Example
//!
//! ```rust
//! use routekit::collector::HandlerKey;
//! use routekit::router::{DataGenerator, Matcher, MatchOutcome, ParsedRoute, RadixGenerator, RadixMatcher, RouteParser, StdParser};
//! use http::Method;
//!
//! let parser = StdParser::new();
//! let routes: Vec<ParsedRoute> = parser
//!     .parse("/users/{id}")
//!     .unwrap()
//!     .into_iter()
//!     .map(|segments| ParsedRoute {
//!         method: Method::GET,
//!         pattern: "/users/{id}".into(),
//!         segments,
//!         handler: HandlerKey::Inline(0),
//!     })
//!     .collect();
//!
//! let data = RadixGenerator::new().generate(&routes).unwrap();
//! let matcher = RadixMatcher::from_dispatch_data(&data).unwrap();
//!
//! match matcher.lookup(&Method::GET, "/users/42") {
//!     MatchOutcome::Found { params, .. } => assert_eq!(params[0].1, "42"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Performance
//!
//! - Lookup is O(k) in the number of path segments for static routes
//! - Parameters are collected in a [`ParamVec`] (no heap for <= 8 params)
//! - Constraint regexes are compiled once when the matcher is built

mod core;
mod parser;
mod radix;

pub use core::{
    DataGenerator, DispatchData, MatchOutcome, Matcher, ParamVec, ParsedRoute, RouteParser,
    Segment, MAX_INLINE_PARAMS,
};
pub use parser::StdParser;
pub use radix::{RadixGenerator, RadixMatcher, RADIX_GENERATOR};
