//! The directory IV cache.
//!
//! Maps relative plaintext directory paths to the directory IV and relative
//! ciphertext path, so that name encryption for a directory does not need a
//! storage read of its IV file on every lookup.
//!
//! # Structure
//!
//! Entries form a tree mirroring the plaintext hierarchy. Each node keeps
//! only its own ciphertext segment; full ciphertext paths are rebuilt while
//! walking down. Renaming or deleting a directory therefore invalidates
//! exactly that directory's subtree.
//!
//! # Staleness and size
//!
//! The whole cache shares one expiry timestamp, armed by the first store
//! after creation, [`DirCache::clear`] or a previous expiry. Once it passes,
//! every entry except the root IV is discarded on the next access. There is
//! no background timer. The number of cached directories is bounded by
//! [`DirCacheConfig::max_entries`]; when full, one arbitrary entry is evicted
//! per insert.
//!
//! # Thread Safety
//!
//! A single `parking_lot::RwLock` guards the whole tree. Lookups share the
//! read lock, everything else takes the write lock. Critical sections are
//! short pointer walks and never perform I/O.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, trace};

use crate::config::DirCacheConfig;
use crate::entry::{CacheEntry, CachedDir, DirIv};
use crate::error::{DirCacheError, check_depth};
use crate::node::TreeNode;
use crate::stats::CacheStats;

/// Lock-protected state: the tree plus its container-level bookkeeping.
#[derive(Debug, Default)]
struct Tree {
    /// `None` until the root IV is stored for the first time.
    root: Option<TreeNode>,
    /// When the non-root entries expire. `None` while disarmed.
    expiry: Option<Instant>,
    /// Number of non-root nodes in the tree.
    size: usize,
}

impl Tree {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Drop every non-root node and disarm the expiry clock.
    ///
    /// Returns the number of discarded entries.
    fn reset(&mut self) -> usize {
        let discarded = self.size;
        if let Some(root) = self.root.as_mut() {
            root.children = Some(Default::default());
        }
        self.expiry = None;
        self.size = 0;
        discarded
    }
}

/// Thread-safe cache of directory IVs and ciphertext paths.
///
/// The root directory (`""`) is special: its IV is kept for the lifetime of
/// the cache and survives expiry and [`clear`](Self::clear), since the root
/// can never be renamed or deleted.
///
/// A hit is an optimization hint, not a proof: entries may lag behind the
/// storage by up to [`DirCacheConfig::max_time`] if the ciphertext tree is
/// modified behind the filesystem's back.
///
/// # Example
///
/// ```
/// use oxcrypt_dircache::{DirCache, DirIv};
///
/// let cache = DirCache::with_defaults();
/// cache.store("", DirIv::from([0u8; 16]), "");
/// cache.store("docs", DirIv::from([1u8; 16]), "Zm9v");
/// cache.store("docs/2024", DirIv::from([2u8; 16]), "Zm9v/YmFy");
///
/// let hit = cache.lookup("docs/2024").unwrap();
/// assert_eq!(hit.cipher_path, "Zm9v/YmFy");
/// assert_eq!(hit.iv, DirIv::from([2u8; 16]));
///
/// // Renaming "docs" must invalidate everything below it.
/// cache.remove("docs");
/// assert!(cache.lookup("docs/2024").is_none());
/// ```
#[derive(Debug)]
pub struct DirCache {
    config: DirCacheConfig,
    tree: RwLock<Tree>,
    stats: CacheStats,
}

impl Default for DirCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DirCache {
    /// Create an empty cache with the given limits.
    pub fn new(config: DirCacheConfig) -> Self {
        Self {
            config,
            tree: RwLock::new(Tree::default()),
            stats: CacheStats::new(),
        }
    }

    /// Create an empty cache holding up to 100 directories for 1 second.
    pub fn with_defaults() -> Self {
        Self::new(DirCacheConfig::default())
    }

    /// Wrap this cache in an `Arc` for sharing across filesystem workers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The limits this cache was created with.
    pub fn config(&self) -> &DirCacheConfig {
        &self.config
    }

    /// Hit/miss and invalidation counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached non-root directories.
    ///
    /// Entries whose expiry window has passed count as absent.
    pub fn len(&self) -> usize {
        let tree = self.tree.read();
        if tree.is_expired(Instant::now()) {
            0
        } else {
            tree.size
        }
    }

    /// True if no non-root directory is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the IV and relative ciphertext path of plaintext directory `dir`.
    ///
    /// `dir` is relative to the filesystem root and `/`-separated; `""` is the
    /// root, which hits whenever its IV was ever stored. Any other path hits
    /// only if every segment down to it is cached and the cache has not
    /// expired.
    pub fn lookup(&self, dir: &str) -> Option<CachedDir> {
        if dir.is_empty() {
            let hit = self.tree.read().root.as_ref().map(|root| CachedDir {
                iv: root.entry.iv.clone(),
                cipher_path: String::new(),
            });
            self.record_lookup(dir, hit.is_some());
            return hit;
        }

        let now = Instant::now();
        {
            let tree = self.tree.read();
            if !tree.is_expired(now) {
                let hit = tree
                    .root
                    .as_ref()
                    .and_then(|root| root.resolve(dir.split('/')))
                    .map(|(node, cipher_path)| CachedDir {
                        iv: node.entry.iv.clone(),
                        cipher_path,
                    });
                drop(tree);
                self.record_lookup(dir, hit.is_some());
                return hit;
            }
        }

        // Lazy expiry: the read lock is released, so re-check under the
        // write lock before discarding anything.
        self.purge_if_expired(&mut self.tree.write(), Instant::now());
        self.record_lookup(dir, false);
        None
    }

    /// Remember the IV and relative ciphertext path of plaintext directory
    /// `dir`.
    ///
    /// Storing `""` (with an empty `c_dir`) sets the root IV and initializes
    /// the cache. Other directories are only stored if their parent is already
    /// cached; otherwise the call is silently dropped, as is any store before
    /// the root was initialized. Replacing a cached directory discards the
    /// entries below it.
    ///
    /// # Panics
    ///
    /// Panics if `dir` and `c_dir` have a different number of segments. That
    /// is a bug in the caller, and caching the pair would corrupt every
    /// ciphertext path later rebuilt through it. Use [`try_store`](Self::try_store)
    /// to handle the violation instead.
    pub fn store(&self, dir: &str, iv: impl Into<DirIv>, c_dir: &str) {
        if let Err(err) = self.try_store(dir, iv, c_dir) {
            error!(dir = %dir, c_dir = %c_dir, "refusing to cache directory: {err}");
            panic!("{err}");
        }
    }

    /// Like [`store`](Self::store), but reports a depth mismatch as an error
    /// instead of panicking. The cache is left untouched on error.
    pub fn try_store(
        &self,
        dir: &str,
        iv: impl Into<DirIv>,
        c_dir: &str,
    ) -> Result<(), DirCacheError> {
        check_depth(dir, c_dir)?;
        let iv = iv.into();

        let mut guard = self.tree.write();
        let tree = &mut *guard;
        let now = Instant::now();
        self.purge_if_expired(tree, now);

        if dir.is_empty() {
            self.store_root(tree, iv, now);
        } else {
            self.store_dir(tree, dir, iv, c_dir, now);
        }
        Ok(())
    }

    /// Forget `dir` and every directory below it.
    ///
    /// Must be called before a rename or delete of `dir` becomes visible to
    /// other filesystem operations. Removing an uncached directory, or the
    /// root, is a no-op.
    pub fn remove(&self, dir: &str) {
        if dir.is_empty() {
            debug!("ignoring removal of the root directory");
            return;
        }

        let mut guard = self.tree.write();
        let tree = &mut *guard;
        let Some(root) = tree.root.as_mut() else {
            return;
        };

        let segments: Vec<&str> = dir.split('/').collect();
        let Some((name, parents)) = segments.split_last() else {
            return;
        };
        let removed = root
            .descend_mut(parents.iter().copied())
            .and_then(|parent| parent.remove_child(name));

        match removed {
            Some(node) => {
                let count = node.subtree_len();
                tree.size -= count;
                self.stats.record_invalidations(count);
                debug!(dir = %dir, entries = count, "removed cached directory subtree");
            }
            None => trace!(dir = %dir, "remove: directory not cached"),
        }
    }

    /// Discard every cached directory except the root IV.
    ///
    /// The next store re-arms the expiry window.
    pub fn clear(&self) {
        let discarded = self.tree.write().reset();
        self.stats.record_invalidations(discarded);
        debug!(entries = discarded, "cleared directory IV cache");
    }

    fn record_lookup(&self, dir: &str, hit: bool) {
        if hit {
            self.stats.record_hit();
            trace!(dir = %dir, "dir IV cache hit");
        } else {
            self.stats.record_miss();
            trace!(dir = %dir, "dir IV cache miss");
        }
    }

    fn purge_if_expired(&self, tree: &mut Tree, now: Instant) {
        if tree.is_expired(now) {
            let discarded = tree.reset();
            self.stats.record_expiration();
            debug!(entries = discarded, "directory IV cache expired");
        }
    }

    fn arm_expiry(&self, tree: &mut Tree, now: Instant) {
        if tree.expiry.is_none() {
            tree.expiry = Some(now + self.config.max_time);
        }
    }

    fn store_root(&self, tree: &mut Tree, iv: DirIv, now: Instant) {
        match tree.root.as_mut() {
            Some(root) if root.entry.iv == iv => {
                root.children.get_or_insert_with(Default::default);
            }
            Some(root) => {
                // Every cached ciphertext name below was derived from the old IV.
                root.entry.iv = iv;
                let discarded = tree.reset();
                self.stats.record_invalidations(discarded);
                debug!(entries = discarded, "root IV changed, discarded cached subtree");
            }
            None => {
                tree.root = Some(TreeNode::directory(CacheEntry::root(iv)));
                tree.size = 0;
                debug!("initialized directory IV cache");
            }
        }
        self.arm_expiry(tree, now);
        self.stats.record_store();
    }

    fn store_dir(&self, tree: &mut Tree, dir: &str, iv: DirIv, c_dir: &str, now: Instant) {
        let Some(root) = tree.root.as_mut() else {
            self.stats.record_dropped_store();
            debug!(dir = %dir, "dropping store: cache not initialized");
            return;
        };

        let segments: Vec<&str> = dir.split('/').collect();
        let Some((name, parents)) = segments.split_last() else {
            return;
        };
        let cipher_segment = c_dir.rsplit('/').next().unwrap_or(c_dir);

        // Only existing intermediate directories are followed.
        let Some(parent) = root.descend_mut(parents.iter().copied()) else {
            self.stats.record_dropped_store();
            debug!(dir = %dir, "dropping store: parent directory not cached");
            return;
        };
        if let Some(old) = parent.remove_child(name) {
            let count = old.subtree_len();
            tree.size -= count;
            self.stats.record_invalidations(count - 1);
        }

        if tree.size >= self.config.max_entries {
            // Ancestors of `dir` are protected so the parent survives eviction.
            let Some(victim) = root.evictable_leaf(parents) else {
                self.stats.record_dropped_store();
                debug!(dir = %dir, "dropping store: no evictable entry");
                return;
            };
            let evicted = victim.split_last().and_then(|(leaf, above)| {
                root.descend_mut(above.iter().map(String::as_str))
                    .and_then(|node| node.remove_child(leaf))
            });
            if evicted.is_some() {
                tree.size -= 1;
                self.stats.record_eviction();
                debug!(evicted = ?victim, "evicted directory to stay within capacity");
            }
        }

        let Some(parent) = root.descend_mut(parents.iter().copied()) else {
            return;
        };
        parent.insert_child(
            *name,
            TreeNode::directory(CacheEntry::new(iv, cipher_segment)),
        );
        tree.size += 1;
        self.arm_expiry(tree, now);
        self.stats.record_store();
        trace!(dir = %dir, c_dir = %c_dir, "cached directory IV");
    }
}
