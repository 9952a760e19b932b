//! Cache configuration.
//!
//! Two knobs bound the cache: how many directories it may hold and how long
//! the whole cache may be served before it is discarded. Short windows keep
//! out-of-band changes to the ciphertext tree from being visible for long,
//! like `attr_timeout` does for the kernel attribute cache.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum number of cached directories.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default lifetime of the whole cache (1 second).
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(1);

/// Configuration options for [`DirCache`](crate::DirCache).
///
/// Durations are (de)serialized in human-readable form (`"1s"`, `"250ms"`).
///
/// ```
/// use oxcrypt_dircache::DirCacheConfig;
/// use std::time::Duration;
///
/// let config = DirCacheConfig::default()
///     .max_entries(500)
///     .max_time(Duration::from_millis(250));
/// assert_eq!(config.max_entries, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirCacheConfig {
    /// Maximum number of cached non-root directories.
    ///
    /// When full, one arbitrary entry is evicted per insert. Zero disables
    /// caching of everything but the root. Default: 100.
    pub max_entries: usize,

    /// Time after which the whole cache (root IV excepted) is discarded.
    ///
    /// The window starts at the first store after creation, `clear()` or a
    /// previous expiry. Default: 1 second.
    #[serde(with = "humantime_serde")]
    pub max_time: Duration,
}

impl Default for DirCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_time: DEFAULT_MAX_TIME,
        }
    }
}

impl DirCacheConfig {
    /// Creates a configuration with explicit limits.
    pub fn new(max_entries: usize, max_time: Duration) -> Self {
        Self {
            max_entries,
            max_time,
        }
    }

    /// Sets the maximum number of cached directories.
    #[must_use]
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the expiry window of the whole cache.
    #[must_use]
    pub fn max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DirCacheConfig::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.max_time, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_pattern() {
        let config = DirCacheConfig::default()
            .max_entries(8)
            .max_time(Duration::from_millis(50));
        assert_eq!(config, DirCacheConfig::new(8, Duration::from_millis(50)));
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: DirCacheConfig =
            serde_json::from_str(r#"{"max_entries": 250, "max_time": "500ms"}"#).unwrap();
        assert_eq!(config.max_entries, 250);
        assert_eq!(config.max_time, Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_missing_fields_use_defaults() {
        let config: DirCacheConfig = serde_json::from_str(r#"{"max_time": "2s"}"#).unwrap();
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.max_time, Duration::from_secs(2));
    }

    #[test]
    fn test_serialize_roundtrips_through_json() {
        let config = DirCacheConfig::new(42, Duration::from_secs(3));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"3s\""), "got {json}");
    }
}
