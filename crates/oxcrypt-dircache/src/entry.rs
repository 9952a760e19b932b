//! Cached values: directory IVs and the ciphertext segment they belong to.

use std::fmt;
use std::sync::Arc;

/// Opaque directory initialization vector.
///
/// The cache never interprets these bytes; their length and meaning belong to
/// the name-encryption layer. Cloning is cheap (shared, immutable storage), so
/// a hit can hand out the IV without copying it under the lock.
///
/// # Examples
///
/// ```
/// use oxcrypt_dircache::DirIv;
///
/// let iv = DirIv::from(vec![0u8; 16]);
/// assert_eq!(iv.len(), 16);
/// assert_eq!(iv.as_bytes(), &[0u8; 16]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DirIv(Arc<[u8]>);

impl DirIv {
    /// Create an IV from raw bytes.
    #[inline]
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        DirIv(Arc::from(bytes.as_ref()))
    }

    /// Borrow the raw IV bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the IV.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length IV.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for DirIv {
    fn from(bytes: Vec<u8>) -> Self {
        DirIv(Arc::from(bytes))
    }
}

impl From<&[u8]> for DirIv {
    fn from(bytes: &[u8]) -> Self {
        DirIv::new(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for DirIv {
    fn from(bytes: [u8; N]) -> Self {
        DirIv::new(bytes)
    }
}

impl AsRef<[u8]> for DirIv {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// IVs show up in debug logs; keep them short and hex-encoded.
impl fmt::Debug for DirIv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirIv(")?;
        for byte in self.0.iter().take(8) {
            write!(f, "{byte:02x}")?;
        }
        if self.0.len() > 8 {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}

/// The value stored for one directory: its IV and the ciphertext name of the
/// directory inside its parent.
///
/// Only the last ciphertext component is kept. The full ciphertext path is
/// rebuilt by joining the segments of every node on the way down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// IV used to encrypt the names of this directory's children.
    pub iv: DirIv,
    /// Ciphertext name of this directory. Empty for the root.
    pub cipher_segment: String,
}

impl CacheEntry {
    /// Create a new entry.
    pub fn new(iv: DirIv, cipher_segment: impl Into<String>) -> Self {
        Self {
            iv,
            cipher_segment: cipher_segment.into(),
        }
    }

    /// Entry for the filesystem root, whose ciphertext path is always empty.
    pub fn root(iv: DirIv) -> Self {
        Self {
            iv,
            cipher_segment: String::new(),
        }
    }
}

/// Result of a cache hit: the directory IV plus the full relative ciphertext
/// path of the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDir {
    /// IV of the directory that was looked up.
    pub iv: DirIv,
    /// Relative ciphertext path, `/`-separated. Empty for the root.
    pub cipher_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_iv_conversions_agree() {
        let a = DirIv::from(vec![1u8, 2, 3]);
        let b = DirIv::from([1u8, 2, 3]);
        let c = DirIv::from(&[1u8, 2, 3][..]);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.len(), 3);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_dir_iv_clone_shares_storage() {
        let iv = DirIv::from(vec![7u8; 16]);
        let copy = iv.clone();
        assert!(std::ptr::eq(iv.as_bytes(), copy.as_bytes()));
    }

    #[test]
    fn test_dir_iv_debug_is_truncated() {
        let iv = DirIv::from(vec![0xabu8; 16]);
        assert_eq!(format!("{iv:?}"), "DirIv(abababababababab..)");

        let short = DirIv::from([0x01u8, 0x02]);
        assert_eq!(format!("{short:?}"), "DirIv(0102)");
    }

    #[test]
    fn test_root_entry_has_empty_segment() {
        let entry = CacheEntry::root(DirIv::from([0u8; 4]));
        assert!(entry.cipher_segment.is_empty());
    }
}
