//! # Route Cache Module
//!
//! Persistence of compiled [`crate::router::DispatchData`] so the parse and
//! generate phases can be skipped on later constructions.
//!
//! ## Overview
//!
//! - [`CacheDriver`] is the storage contract: byte values under string keys
//! - [`MemoryCache`] keeps entries in a process-local concurrent map
//! - [`FilesystemCache`] keeps one file per key in a directory
//! - [`RouteCache`] is the load-or-compile layer used by the middleware
//!
//! ## Cache Key Structure
//!
//! Keys are formatted as `{prefix}:{fingerprint}`:
//! - `prefix`: fixed identifier for the application, `routekit.routes` by default
//! - `fingerprint`: first 16 hex chars of the SHA-256 of the route listing
//!
//! A changed route table therefore lands in a new entry instead of reading a
//! stale one. Old entries are never removed by the middleware; use
//! [`CacheDriver::clear`] or the `routekit-cache` binary.

mod filesystem;
mod layer;
mod memory;

pub use filesystem::{FilesystemCache, DEFAULT_EXTENSION};
pub use layer::{RouteCache, DEFAULT_KEY_PREFIX};
pub use memory::MemoryCache;

use crate::error::CacheError;

/// Storage contract for compiled route tables.
///
/// Implementations must be safe to share across threads. No method retries.
pub trait CacheDriver: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Whether a value is stored under `key`
    fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Remove the value stored under `key`; returns whether one existed
    fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry; returns how many were removed
    fn clear(&self) -> Result<usize, CacheError>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}
