//! # Routing Configuration
//!
//! Typed construction-time configuration of the routing middleware.
//!
//! Four collaborators are required: the route `collection` closure, a
//! [`RouteParser`], a [`DataGenerator`] and a `dispatcher` factory building a
//! [`Matcher`] from dispatch data. Their capabilities are checked by the type
//! system; [`RoutingConfigBuilder::build`] only checks presence and the one
//! conditional rule: `cache(true)` needs a cache driver.
//!
//! ```rust
//! use routekit::{handler, RoutingConfig};
//!
//! let config = RoutingConfig::<String>::standard(|routes| {
//!     routes.get("/", handler(|_req, res, _params| res));
//! })
//! .build()
//! .unwrap();
//! assert!(!config.cache_enabled());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheDriver, RouteCache, DEFAULT_KEY_PREFIX};
use crate::collector::RouteCollector;
use crate::error::RoutingError;
use crate::handlers::ControllerRegistry;
use crate::router::{
    DataGenerator, DispatchData, Matcher, RadixGenerator, RadixMatcher, RouteParser, StdParser,
};
use crate::runtime_config::RoutingSettings;

/// Route registration closure, called once per middleware construction
pub type Collection<B> = Box<dyn FnOnce(&mut RouteCollector<B>) + Send>;

/// Builds a matcher from dispatch data; `None` rejects the data
pub type DispatcherFactory = Arc<dyn Fn(&DispatchData) -> Option<Arc<dyn Matcher>> + Send + Sync>;

/// What the middleware does when no route matches the request path.
///
/// `MethodNotAllowed` never falls through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallthrough {
    /// Fail with [`RoutingError::RouteNotFound`]
    #[default]
    Error,
    /// Hand the request to the next middleware
    #[serde(alias = "next")]
    Delegate,
}

impl FromStr for Fallthrough {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Fallthrough::Error),
            "delegate" | "next" => Ok(Fallthrough::Delegate),
            other => Err(format!("unknown fallthrough policy '{other}'")),
        }
    }
}

impl fmt::Display for Fallthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fallthrough::Error => "error",
            Fallthrough::Delegate => "delegate",
        })
    }
}

/// Validated configuration, consumed by [`crate::Routing::new`].
pub struct RoutingConfig<B> {
    pub(crate) collection: Collection<B>,
    pub(crate) parser: Arc<dyn RouteParser>,
    pub(crate) generator: Arc<dyn DataGenerator>,
    pub(crate) dispatcher: DispatcherFactory,
    pub(crate) cache: Option<RouteCache>,
    pub(crate) controllers: Arc<ControllerRegistry<B>>,
    pub(crate) fallthrough: Fallthrough,
}

impl<B: 'static> RoutingConfig<B> {
    /// Start an empty builder
    #[must_use]
    pub fn builder() -> RoutingConfigBuilder<B> {
        RoutingConfigBuilder::new()
    }

    /// Builder wired with the standard parser, radix generator and radix
    /// matcher around `collection`
    pub fn standard<F>(collection: F) -> RoutingConfigBuilder<B>
    where
        F: FnOnce(&mut RouteCollector<B>) + Send + 'static,
    {
        RoutingConfigBuilder::new()
            .collection(collection)
            .standard_collaborators()
    }

    /// Whether compiled route tables go through the cache
    #[must_use]
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Configured no-match policy
    #[must_use]
    pub fn fallthrough(&self) -> Fallthrough {
        self.fallthrough
    }
}

impl<B> fmt::Debug for RoutingConfig<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingConfig")
            .field("cache", &self.cache)
            .field("controllers", &self.controllers)
            .field("fallthrough", &self.fallthrough)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RoutingConfig`].
pub struct RoutingConfigBuilder<B> {
    collection: Option<Collection<B>>,
    parser: Option<Arc<dyn RouteParser>>,
    generator: Option<Arc<dyn DataGenerator>>,
    dispatcher: Option<DispatcherFactory>,
    cache: bool,
    cache_driver: Option<Arc<dyn CacheDriver>>,
    cache_key: String,
    controllers: Option<ControllerRegistry<B>>,
    fallthrough: Fallthrough,
}

impl<B: 'static> RoutingConfigBuilder<B> {
    /// Create a builder with nothing set
    #[must_use]
    pub fn new() -> Self {
        Self {
            collection: None,
            parser: None,
            generator: None,
            dispatcher: None,
            cache: false,
            cache_driver: None,
            cache_key: DEFAULT_KEY_PREFIX.to_string(),
            controllers: None,
            fallthrough: Fallthrough::default(),
        }
    }

    /// Route registration closure (required)
    #[must_use]
    pub fn collection<F>(mut self, collection: F) -> Self
    where
        F: FnOnce(&mut RouteCollector<B>) + Send + 'static,
    {
        self.collection = Some(Box::new(collection));
        self
    }

    /// Pattern parser (required)
    #[must_use]
    pub fn parser(mut self, parser: Arc<dyn RouteParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Dispatch data generator (required)
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn DataGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Matcher factory (required)
    #[must_use]
    pub fn dispatcher<F>(mut self, factory: F) -> Self
    where
        F: Fn(&DispatchData) -> Option<Arc<dyn Matcher>> + Send + Sync + 'static,
    {
        self.dispatcher_factory(Arc::new(factory))
    }

    /// Matcher factory given as a shared [`DispatcherFactory`], such as
    /// [`RadixMatcher::factory`]
    #[must_use]
    pub fn dispatcher_factory(mut self, factory: DispatcherFactory) -> Self {
        self.dispatcher = Some(factory);
        self
    }

    /// Set parser, generator and dispatcher to the radix reference implementation
    #[must_use]
    pub fn standard_collaborators(mut self) -> Self {
        self.parser = Some(Arc::new(StdParser::new()));
        self.generator = Some(Arc::new(RadixGenerator::new()));
        self.dispatcher_factory(RadixMatcher::factory())
    }

    /// Enable or disable the route cache (default: disabled)
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Cache driver; required when the cache is enabled
    #[must_use]
    pub fn cache_driver(mut self, driver: Arc<dyn CacheDriver>) -> Self {
        self.cache_driver = Some(driver);
        self
    }

    /// Prefix of cache keys (default: `routekit.routes`)
    #[must_use]
    pub fn cache_key(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key = prefix.into();
        self
    }

    /// Controllers for deferred `Class:method` handlers
    #[must_use]
    pub fn controllers(mut self, registry: ControllerRegistry<B>) -> Self {
        self.controllers = Some(registry);
        self
    }

    /// No-match policy (default: [`Fallthrough::Error`])
    #[must_use]
    pub fn fallthrough(mut self, policy: Fallthrough) -> Self {
        self.fallthrough = policy;
        self
    }

    /// Apply deployment settings.
    ///
    /// Sets the cache flag, key prefix and fallthrough policy. When the cache
    /// is enabled and no driver was given, a filesystem driver rooted at the
    /// configured cache directory is used.
    #[must_use]
    pub fn settings(mut self, settings: &RoutingSettings) -> Self {
        self.cache = settings.cache;
        self.cache_key = settings.cache_key.clone();
        self.fallthrough = settings.fallthrough;
        if settings.cache && self.cache_driver.is_none() {
            self.cache_driver = Some(Arc::new(settings.cache_driver()));
        }
        self
    }

    /// Validate and finish the configuration.
    ///
    /// # Errors
    ///
    /// [`RoutingError::Configuration`] naming the first missing collaborator,
    /// or when the cache is enabled without a driver.
    pub fn build(self) -> Result<RoutingConfig<B>, RoutingError> {
        let collection = self.collection.ok_or_else(|| missing("collection"))?;
        let parser = self.parser.ok_or_else(|| missing("parser"))?;
        let generator = self.generator.ok_or_else(|| missing("generator"))?;
        let dispatcher = self.dispatcher.ok_or_else(|| missing("dispatcher"))?;

        let cache = match (self.cache, self.cache_driver) {
            (true, Some(driver)) => {
                if self.cache_key.trim().is_empty() {
                    return Err(RoutingError::config("cache key prefix must not be empty"));
                }
                Some(RouteCache::new(driver, self.cache_key))
            }
            (true, None) => {
                return Err(RoutingError::config(
                    "cache is enabled but no cache driver was configured",
                ))
            }
            (false, _) => None,
        };

        Ok(RoutingConfig {
            collection,
            parser,
            generator,
            dispatcher,
            cache,
            controllers: Arc::new(self.controllers.unwrap_or_default()),
            fallthrough: self.fallthrough,
        })
    }
}

impl<B: 'static> Default for RoutingConfigBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(field: &str) -> RoutingError {
    RoutingError::config(format!("missing required collaborator '{field}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    #[test]
    fn test_fallthrough_parse() {
        assert_eq!("Delegate".parse::<Fallthrough>(), Ok(Fallthrough::Delegate));
        assert_eq!("error".parse::<Fallthrough>(), Ok(Fallthrough::Error));
        assert!("skip".parse::<Fallthrough>().is_err());
        assert_eq!(Fallthrough::Delegate.to_string(), "delegate");
    }

    #[test]
    fn test_settings_supply_a_filesystem_driver() {
        let settings = RoutingSettings {
            cache: true,
            cache_key: "app.routes".into(),
            fallthrough: Fallthrough::Delegate,
            ..RoutingSettings::default()
        };
        let config = RoutingConfig::<String>::standard(|_| {})
            .settings(&settings)
            .build()
            .unwrap();
        assert!(config.cache_enabled());
        assert_eq!(config.fallthrough(), Fallthrough::Delegate);
    }

    #[test]
    fn test_explicit_driver_is_kept() {
        let config = RoutingConfig::<String>::standard(|_| {})
            .cache_driver(Arc::new(MemoryCache::new()))
            .settings(&RoutingSettings {
                cache: true,
                ..RoutingSettings::default()
            })
            .build()
            .unwrap();
        assert!(config.cache_enabled());
    }

    #[test]
    fn test_empty_cache_key_is_rejected() {
        let err = RoutingConfig::<String>::standard(|_| {})
            .cache(true)
            .cache_driver(Arc::new(MemoryCache::new()))
            .cache_key(" ")
            .build()
            .unwrap_err();
        assert!(matches!(err, RoutingError::Configuration(_)));
    }
}
