//! # CLI Module
//!
//! Operator commands for a filesystem route cache, shipped as the
//! `routekit-cache` binary.
//!
//! ## Commands
//!
//! ### `list`
//!
//! List cached route tables with their size:
//!
//! ```bash
//! routekit-cache --dir .cache list
//! ```
//!
//! ### `inspect`
//!
//! Decode one entry and print its generator and dispatch data:
//!
//! ```bash
//! routekit-cache --dir .cache inspect routekit.routes:3f2a9c0d1e4b5a67
//! ```
//!
//! ### `clear`
//!
//! Remove every entry, forcing the next middleware construction to compile:
//!
//! ```bash
//! routekit-cache --dir .cache clear
//! ```
//!
//! `--dir` defaults to `ROUTEKIT_CACHE_DIR`, then `.cache`.

mod commands;


pub use commands::{run_cli, Cli, Commands};
