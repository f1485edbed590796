//! Expiration policy for cache entries

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SLIDING_MINUTES: u64 = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntryOptions {
    /// Entry expires this long after it was written
    pub absolute_expiration: Option<Duration>,
    /// Entry expires after this long without being read or refreshed
    pub sliding_expiration: Option<Duration>,
}

impl CacheEntryOptions {
    pub fn sliding(duration: Duration) -> Self {
        Self {
            absolute_expiration: None,
            sliding_expiration: Some(duration),
        }
    }

    pub fn absolute(duration: Duration) -> Self {
        Self {
            absolute_expiration: Some(duration),
            sliding_expiration: None,
        }
    }

    pub fn with_sliding(mut self, duration: Duration) -> Self {
        self.sliding_expiration = Some(duration);
        self
    }
}

type Configurator = Arc<dyn Fn(&str) -> Option<CacheEntryOptions> + Send + Sync>;

/// Global default plus per-cache-name configurators; the first configurator
/// that returns options for a cache name wins.
#[derive(Clone)]
pub struct CacheOptions {
    pub global: CacheEntryOptions,
    configurators: Vec<Configurator>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            global: CacheEntryOptions::sliding(Duration::from_secs(DEFAULT_SLIDING_MINUTES * 60)),
            configurators: Vec::new(),
        }
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("global", &self.global)
            .field("configurators", &self.configurators.len())
            .finish()
    }
}

impl CacheOptions {
    pub fn new(global: CacheEntryOptions) -> Self {
        Self {
            global,
            configurators: Vec::new(),
        }
    }

    pub fn configure<F>(mut self, configurator: F) -> Self
    where
        F: Fn(&str) -> Option<CacheEntryOptions> + Send + Sync + 'static,
    {
        self.configurators.push(Arc::new(configurator));
        self
    }

    /// Options for every cache whose name matches `pattern`
    pub fn rule(self, pattern: &str, options: CacheEntryOptions) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(self.configure(move |name| regex.is_match(name).then(|| options.clone())))
    }

    pub fn entry_options_for(&self, cache_name: &str) -> CacheEntryOptions {
        self.configurators
            .iter()
            .find_map(|configure| configure(cache_name))
            .unwrap_or_else(|| self.global.clone())
    }
}
