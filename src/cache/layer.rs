use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use dashmap::DashMap;
use tracing::{debug, info};

use super::CacheDriver;
use crate::collector::RouteSet;
use crate::compiler::Compiler;
use crate::error::{CacheError, RoutingError};
use crate::router::DispatchData;

/// Default prefix of route cache keys
pub const DEFAULT_KEY_PREFIX: &str = "routekit.routes";

/// Per-key guards shared by every `RouteCache` in the process
fn guards() -> &'static DashMap<String, Arc<Mutex<()>>> {
    static GUARDS: OnceLock<DashMap<String, Arc<Mutex<()>>>> = OnceLock::new();
    GUARDS.get_or_init(DashMap::new)
}

fn key_guard(key: &str) -> Arc<Mutex<()>> {
    Arc::clone(guards().entry(key.to_string()).or_default().value())
}

/// Drop a guard, removing its map entry when no other caller holds it
fn release_guard(key: &str, guard: Arc<Mutex<()>>) {
    drop(guard);
    guards().remove_if(key, |_, g| Arc::strong_count(g) == 1);
}

/// Load-or-compile layer over a [`CacheDriver`].
#[derive(Clone)]
pub struct RouteCache {
    driver: Arc<dyn CacheDriver>,
    prefix: String,
}

impl RouteCache {
    /// Create a cache layer writing keys under `prefix`
    pub fn new(driver: Arc<dyn CacheDriver>, prefix: impl Into<String>) -> Self {
        Self {
            driver,
            prefix: prefix.into(),
        }
    }

    /// Cache key for a route set with the given fingerprint
    #[must_use]
    pub fn key_for(&self, fingerprint: &str) -> String {
        format!("{}:{}", self.prefix, fingerprint)
    }

    /// Return the dispatch data for `routes`, compiling only on a miss.
    ///
    /// Concurrent callers for the same key in one process are serialized, so
    /// the entry is compiled and written at most once. A stored entry that
    /// does not decode is reported as [`CacheError::Corrupt`] and left in
    /// place.
    pub fn load_or_compile<B>(
        &self,
        routes: &RouteSet<B>,
        compiler: &Compiler,
    ) -> Result<DispatchData, RoutingError> {
        let key = self.key_for(&routes.fingerprint());
        let guard = key_guard(&key);
        let result = {
            let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);
            self.load_or_compile_locked(&key, routes, compiler)
        };
        release_guard(&key, guard);
        result
    }

    fn load_or_compile_locked<B>(
        &self,
        key: &str,
        routes: &RouteSet<B>,
        compiler: &Compiler,
    ) -> Result<DispatchData, RoutingError> {
        if let Some(bytes) = self.driver.fetch(key)? {
            let data = DispatchData::from_bytes(&bytes).map_err(|e| CacheError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            info!(key = %key, bytes = bytes.len(), "Route cache hit");
            return Ok(data);
        }

        debug!(key = %key, "Route cache miss, compiling");
        let data = compiler.compile(routes)?;
        let bytes = data.to_bytes().map_err(|e| {
            RoutingError::compile(format!("cannot serialize dispatch data: {e}"))
        })?;
        self.driver.save(key, &bytes)?;
        info!(key = %key, bytes = bytes.len(), "Route cache populated");
        Ok(data)
    }
}

impl std::fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::collector::RouteCollector;
    use crate::router::{RadixGenerator, StdParser};

    fn routes() -> RouteSet<String> {
        let mut c = RouteCollector::new();
        c.get("/", "Home:index");
        c.into_route_set().unwrap()
    }

    fn compiler() -> Compiler {
        Compiler::new(Arc::new(StdParser::new()), Arc::new(RadixGenerator::new()))
    }

    #[test]
    fn test_miss_writes_then_hit_reads() {
        let store = MemoryCache::new();
        let cache = RouteCache::new(Arc::new(store.clone()), "test.layer.hit");
        let set = routes();
        let key = cache.key_for(&set.fingerprint());

        let first = cache.load_or_compile(&set, &compiler()).unwrap();
        assert!(store.contains(&key).unwrap());
        let second = cache.load_or_compile(&set, &compiler()).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.keys().unwrap(), vec![key]);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let store = MemoryCache::new();
        let cache = RouteCache::new(Arc::new(store.clone()), "test.layer.corrupt");
        let set = routes();
        let key = cache.key_for(&set.fingerprint());
        store.save(&key, b"not json").unwrap();

        let err = cache.load_or_compile(&set, &compiler()).unwrap_err();
        assert!(matches!(err, RoutingError::Cache(CacheError::Corrupt { .. })));
        assert_eq!(store.fetch(&key).unwrap().as_deref(), Some(&b"not json"[..]));
    }

    #[test]
    fn test_guard_is_released_after_use() {
        let cache = RouteCache::new(Arc::new(MemoryCache::new()), "test.layer.release");
        let set = routes();
        let key = cache.key_for(&set.fingerprint());

        cache.load_or_compile(&set, &compiler()).unwrap();
        assert!(!guards().contains_key(&key));

        // An outstanding holder keeps the entry alive
        let held = key_guard(&key);
        let other = key_guard(&key);
        release_guard(&key, other);
        assert!(guards().contains_key(&key));
        release_guard(&key, held);
        assert!(!guards().contains_key(&key));
    }

    #[test]
    fn test_key_format() {
        let cache = RouteCache::new(Arc::new(MemoryCache::new()), DEFAULT_KEY_PREFIX);
        assert_eq!(cache.key_for("0123abcd"), "routekit.routes:0123abcd");
    }
}
