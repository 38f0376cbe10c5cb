//! Error types for blob cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// A missing entry is *not* an error — it is the cache-miss signal, reported
/// through the return value of `read_entry`. Everything here is a fault that
/// aborts the current operation; the caller decides whether to degrade to
/// recomputing the artifact.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while opening, writing, or deleting a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A cache entry ended before the expected number of bytes was read.
    ///
    /// Zero bytes read while bytes were still expected is unexpected
    /// end-of-file, never a silent partial result.
    #[error("truncated cache entry at {path}: expected {expected} bytes, read {read}")]
    TruncatedEntry {
        /// The entry file path.
        path: PathBuf,
        /// Entry size reported by file metadata.
        expected: u64,
        /// Bytes actually read before the entry ended.
        read: u64,
    },

    /// The caller-supplied writer or reader callback failed.
    #[error("stream callback failed for cache entry {id}: {source}")]
    Stream {
        /// Identifier of the entry being written or read.
        id: String,
        /// The error returned by the callback.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/abc.blob"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("abc.blob"));
    }

    #[test]
    fn truncated_entry_display() {
        let err = CacheError::TruncatedEntry {
            path: PathBuf::from("short.blob"),
            expected: 1024,
            read: 512,
        };
        let msg = err.to_string();
        assert!(msg.contains("truncated cache entry"));
        assert!(msg.contains("expected 1024"));
        assert!(msg.contains("read 512"));
    }

    #[test]
    fn stream_error_display() {
        let err = CacheError::Stream {
            id: "deadbeef".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad payload"),
        };
        let msg = err.to_string();
        assert!(msg.contains("deadbeef"));
        assert!(msg.contains("bad payload"));
    }
}
