//! # Dispatcher Module
//!
//! Adapter between the routing middleware and the pluggable [`Matcher`].
//!
//! ## Overview
//!
//! The adapter owns the matcher built from dispatch data by the configured
//! dispatcher factory. For each request it:
//! - normalizes the path (empty path becomes `/`, repeated slashes collapse)
//! - asks the matcher for a [`MatchOutcome`]
//! - percent-decodes captured parameter values
//! - logs the outcome with its matching time
//!
//! The matcher is immutable once built, so one adapter serves any number of
//! concurrent requests without locking.
//!
//! [`Matcher`]: crate::router::Matcher
//! [`MatchOutcome`]: crate::router::MatchOutcome

mod core;

pub use core::{normalize_path, DispatcherAdapter, MatchResult};
