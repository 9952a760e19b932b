//! Shared helpers for the integration tests.

#![allow(dead_code)]

use oxcrypt_dircache::{DirCache, DirCacheConfig, DirIv};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic 16-byte IV derived from a path.
pub fn iv_for(path: &str) -> DirIv {
    let mut bytes = [0u8; 16];
    for (i, b) in path.bytes().enumerate() {
        bytes[i % 16] ^= b.wrapping_add(i as u8);
    }
    DirIv::from(bytes)
}

/// Fake ciphertext name of a plaintext segment.
pub fn cipher_name(segment: &str) -> String {
    segment.bytes().rev().map(|b| format!("{b:02x}")).collect()
}

/// Fake ciphertext path of a plaintext path.
pub fn cipher_path(path: &str) -> String {
    path.split('/').map(cipher_name).collect::<Vec<_>>().join("/")
}

/// A cache with its root initialized and a window long enough that tests
/// never see it expire unless they ask for it.
pub fn initialized_cache(max_entries: usize) -> DirCache {
    let cache = DirCache::new(
        DirCacheConfig::default()
            .max_entries(max_entries)
            .max_time(Duration::from_secs(60)),
    );
    cache.store("", iv_for(""), "");
    cache
}

/// Store `path` and all of its ancestors, top-down.
pub fn store_chain(cache: &DirCache, path: &str) {
    let mut plain = String::new();
    for segment in path.split('/') {
        if !plain.is_empty() {
            plain.push('/');
        }
        plain.push_str(segment);
        cache.store(&plain, iv_for(&plain), &cipher_path(&plain));
    }
}
