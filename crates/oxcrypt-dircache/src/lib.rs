//! Directory IV cache for encrypted filesystem overlays.
//!
//! Encrypting a file name requires the IV of its parent directory, which
//! lives in a per-directory file in the ciphertext tree. This crate caches,
//! per plaintext directory path, that IV together with the directory's
//! relative ciphertext path, so hot-path lookups skip the storage read.
//!
//! # Components
//!
//! - [`DirCache`] - The cache: lookup, store, remove and clear
//! - [`DirCacheConfig`] - Capacity bound and expiry window
//! - [`DirIv`], [`CacheEntry`], [`CachedDir`] - Cached values
//! - [`TreeNode`] - Nodes of the path tree backing the cache
//! - [`CacheStats`] - Hit/miss and invalidation counters
//! - [`DirCacheError`] - Caller contract violations
//!
//! # Example
//!
//! ```
//! use oxcrypt_dircache::{DirCache, DirCacheConfig, DirIv};
//! use std::time::Duration;
//!
//! let cache = DirCache::new(
//!     DirCacheConfig::default()
//!         .max_entries(1000)
//!         .max_time(Duration::from_secs(1)),
//! )
//! .into_shared();
//!
//! // The root IV is stored once when the filesystem is mounted.
//! cache.store("", DirIv::from([0u8; 16]), "");
//!
//! // On a miss, the caller reads the IV from storage and stores it.
//! if cache.lookup("photos").is_none() {
//!     cache.store("photos", DirIv::from([1u8; 16]), "cGhvdG9z");
//! }
//! assert_eq!(cache.lookup("photos").unwrap().cipher_path, "cGhvdG9z");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod node;
pub mod stats;

pub use cache::DirCache;
pub use config::{DEFAULT_MAX_ENTRIES, DEFAULT_MAX_TIME, DirCacheConfig};
pub use entry::{CacheEntry, CachedDir, DirIv};
pub use error::DirCacheError;
pub use node::TreeNode;
pub use stats::{CacheStats, CacheStatsSnapshot};
