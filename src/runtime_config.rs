//! # Runtime Configuration Module
//!
//! Deployment-level settings for the routing middleware, loaded from
//! environment variables or a YAML file and applied with
//! [`crate::config::RoutingConfigBuilder::settings`].
//!
//! ## Environment Variables
//!
//! ### `ROUTEKIT_CACHE`
//!
//! Enables the route cache. Accepts `on|off|true|false|1|0|yes|no`.
//! Default: `off`.
//!
//! ### `ROUTEKIT_CACHE_DIR`
//!
//! Directory of the filesystem cache driver. Default: `.cache`.
//!
//! ### `ROUTEKIT_CACHE_KEY`
//!
//! Prefix of route cache keys. Default: `routekit.routes`.
//!
//! ### `ROUTEKIT_FALLTHROUGH`
//!
//! What to do when no route matches: `error` answers with
//! `RouteNotFound`, `delegate` calls the next middleware. Default: `error`.
//!
//! Unparseable values are logged and replaced by the default.
//!
//! ## Usage
//!
//! ```rust
//! use routekit::runtime_config::RoutingSettings;
//!
//! let settings = RoutingSettings::from_yaml_str("cache: true\ncache_dir: /tmp/routes\n").unwrap();
//! assert!(settings.cache);
//! assert_eq!(settings.cache_key, "routekit.routes");
//! ```

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{FilesystemCache, DEFAULT_EXTENSION, DEFAULT_KEY_PREFIX};
use crate::config::Fallthrough;

/// Default directory of the filesystem cache
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Routing settings loaded from the environment or a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Whether compiled route tables are cached
    pub cache: bool,
    /// Directory of the filesystem cache driver
    pub cache_dir: PathBuf,
    /// Prefix of route cache keys
    pub cache_key: String,
    /// Behaviour when no route matches
    pub fallthrough: Fallthrough,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            cache: false,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_key: DEFAULT_KEY_PREFIX.to_string(),
            fallthrough: Fallthrough::default(),
        }
    }
}

impl RoutingSettings {
    /// Load settings from `ROUTEKIT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(val) = lookup("ROUTEKIT_CACHE") {
            match parse_flag(&val) {
                Some(flag) => settings.cache = flag,
                None => warn!(value = %val, "Ignoring invalid ROUTEKIT_CACHE"),
            }
        }
        if let Some(val) = lookup("ROUTEKIT_CACHE_DIR").filter(|v| !v.trim().is_empty()) {
            settings.cache_dir = PathBuf::from(val.trim());
        }
        if let Some(val) = lookup("ROUTEKIT_CACHE_KEY").filter(|v| !v.trim().is_empty()) {
            settings.cache_key = val.trim().to_string();
        }
        if let Some(val) = lookup("ROUTEKIT_FALLTHROUGH") {
            match val.parse() {
                Ok(policy) => settings.fallthrough = policy,
                Err(e) => warn!(value = %val, error = %e, "Ignoring invalid ROUTEKIT_FALLTHROUGH"),
            }
        }
        settings
    }

    /// Parse settings from YAML; missing fields take their defaults
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse routing settings")
    }

    /// Read settings from a YAML file
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read routing settings: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid routing settings in {}", path.display()))
    }

    /// Filesystem cache driver rooted at [`Self::cache_dir`]
    #[must_use]
    pub fn cache_driver(&self) -> FilesystemCache {
        FilesystemCache::new(&self.cache_dir, DEFAULT_EXTENSION)
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
