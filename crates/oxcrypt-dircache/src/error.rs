//! Error types for the directory IV cache.
//!
//! Misses, expiry and orphaned stores are not errors; they surface as `None`
//! or as silent no-ops. The only failure is a broken caller contract.

use thiserror::Error;

/// Errors reported by [`DirCache`](crate::DirCache).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirCacheError {
    /// Plaintext and ciphertext paths passed to a store have different depths.
    ///
    /// Ciphertext paths preserve depth, so this always points at a bug in the
    /// calling layer. Storing such an entry would corrupt every ciphertext path
    /// later rebuilt through it.
    #[error(
        "inconsistent number of path segments: dir={dir:?} ({dir_depth}) cDir={c_dir:?} ({cipher_depth})"
    )]
    DepthMismatch {
        /// Plaintext path as given by the caller.
        dir: String,
        /// Ciphertext path as given by the caller.
        c_dir: String,
        /// Segment count of `dir`.
        dir_depth: usize,
        /// Segment count of `c_dir`.
        cipher_depth: usize,
    },
}

/// Number of `/`-separated segments in a relative path. The root (`""`) has
/// depth zero.
pub(crate) fn path_depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}

/// Check that a plaintext/ciphertext path pair has matching depth.
pub(crate) fn check_depth(dir: &str, c_dir: &str) -> Result<(), DirCacheError> {
    let dir_depth = path_depth(dir);
    let cipher_depth = path_depth(c_dir);
    if dir_depth == cipher_depth {
        Ok(())
    } else {
        Err(DirCacheError::DepthMismatch {
            dir: dir.to_string(),
            c_dir: c_dir.to_string(),
            dir_depth,
            cipher_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_depth() {
        assert_eq!(path_depth(""), 0);
        assert_eq!(path_depth("a"), 1);
        assert_eq!(path_depth("a/b/c"), 3);
    }

    #[test]
    fn test_check_depth_accepts_matching_paths() {
        assert!(check_depth("", "").is_ok());
        assert!(check_depth("docs/2024", "QmFy/Zm9v").is_ok());
    }

    #[test]
    fn test_check_depth_rejects_mismatch() {
        let err = check_depth("a/b", "X").unwrap_err();
        assert_eq!(
            err,
            DirCacheError::DepthMismatch {
                dir: "a/b".into(),
                c_dir: "X".into(),
                dir_depth: 2,
                cipher_depth: 1,
            }
        );
        assert!(err.to_string().contains("inconsistent number of path segments"));
    }

    #[test]
    fn test_root_with_cipher_path_is_mismatch() {
        assert!(check_depth("", "X").is_err());
    }
}
