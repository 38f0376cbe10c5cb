//! File-backed blob store keyed by opaque identifiers.
//!
//! One file per identifier under a single configured directory, named
//! `<id>.blob`. The payload format is opaque to the store: callers stream
//! bytes through write/read callbacks. Whole entries are loaded into memory
//! before the read callback runs, in bounded chunks so entries larger than
//! a single platform read still load completely.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::locale::ScopedLocale;

/// Chunk size for loading cache entries. Platform read primitives may
/// refuse or short-read requests past a 32-bit byte count, so entries are
/// pulled in at most this many bytes at a time.
const READ_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// File extension for cached blobs.
const BLOB_EXT: &str = "blob";

/// Write-side callback: receives the entry's output stream exactly once.
pub type StreamWriter<'a> = &'a mut dyn FnMut(&mut dyn Write) -> std::io::Result<()>;

/// Read-side callback: receives the entry's full byte stream exactly once.
pub type StreamReader<'a> = &'a mut dyn FnMut(&mut dyn Read) -> std::io::Result<()>;

/// Storage backend for compiled model blobs, keyed by opaque identifiers.
///
/// Identifiers are typically content hashes of the uncompiled input;
/// uniqueness (and path hygiene) is the caller's responsibility. All
/// operations block on the caller's thread. Concurrent operations on the
/// *same* identifier are not serialized by the store and replace-on-write
/// is not atomic; callers that can race a write against a read of one
/// identifier must synchronize externally.
pub trait CacheManager {
    /// Creates or overwrites the entry for `id`, handing `writer` a fresh
    /// binary output stream.
    ///
    /// A writer that produces no bytes leaves a meaningless empty entry;
    /// that is caller error, not a cache fault.
    fn write_entry(&self, id: &str, writer: StreamWriter<'_>) -> Result<(), CacheError>;

    /// Reads the entry for `id`, handing `reader` its full byte stream.
    ///
    /// Returns `Ok(false)` without invoking `reader` when no entry exists
    /// (the cache-miss signal). All bytes are loaded before `reader` runs;
    /// a short or truncated entry is a fatal error, never a partial stream.
    fn read_entry(&self, id: &str, reader: StreamReader<'_>) -> Result<bool, CacheError>;

    /// Deletes the entry for `id` if present; absent entries are a no-op.
    fn remove_entry(&self, id: &str) -> Result<(), CacheError>;
}

/// File-storage implementation of [`CacheManager`].
///
/// Entries live as `<cache_dir>/<id>.blob`. Paths are built with `PathBuf`,
/// so non-ASCII identifiers and cache directories work wherever the
/// platform's native path encoding does.
pub struct FileBlobCache {
    /// Directory holding all cache entries.
    cache_dir: PathBuf,
}

impl FileBlobCache {
    /// Creates a cache rooted at the given directory.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the file path backing the entry for `id`.
    pub fn blob_path(&self, id: &str) -> PathBuf {
        self.cache_dir.join(format!("{id}.{BLOB_EXT}"))
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| CacheError::Io {
            path: self.cache_dir.clone(),
            source: e,
        })
    }
}

impl CacheManager for FileBlobCache {
    fn write_entry(&self, id: &str, writer: StreamWriter<'_>) -> Result<(), CacheError> {
        // Serialized metadata embeds numeric text; pin the locale so a
        // comma-decimal host produces the same bytes as any other.
        let _locale = ScopedLocale::posix(libc::LC_ALL);

        self.ensure_dir()?;
        let path = self.blob_path(id);
        let file = File::create(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;

        let mut stream = BufWriter::new(file);
        writer(&mut stream).map_err(|e| CacheError::Stream {
            id: id.to_string(),
            source: e,
        })?;
        stream.flush().map_err(|e| CacheError::Io { path, source: e })
    }

    fn read_entry(&self, id: &str, reader: StreamReader<'_>) -> Result<bool, CacheError> {
        let _locale = ScopedLocale::posix(libc::LC_ALL);

        let path = self.blob_path(id);
        if !path.exists() {
            return Ok(false);
        }

        // Entry removed between the existence check and the open is a
        // fault, not a miss: the caller already observed the entry.
        let data = read_file_chunked(&path, READ_CHUNK_SIZE)?;
        let mut stream: &[u8] = &data;
        reader(&mut stream).map_err(|e| CacheError::Stream {
            id: id.to_string(),
            source: e,
        })?;
        Ok(true)
    }

    fn remove_entry(&self, id: &str) -> Result<(), CacheError> {
        let path = self.blob_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| CacheError::Io { path, source: e })?;
        }
        Ok(())
    }
}

/// Loads an entire file into memory in chunks of at most `chunk_size` bytes.
///
/// The expected size comes from file metadata; each chunk must fill
/// completely. An entry that ends early yields
/// [`CacheError::TruncatedEntry`].
fn read_file_chunked(path: &Path, chunk_size: usize) -> Result<Vec<u8>, CacheError> {
    debug_assert!(chunk_size > 0);

    let mut file = File::open(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let size = file
        .metadata()
        .map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .len() as usize;

    let mut data = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let chunk = chunk_size.min(size - filled);
        file.read_exact(&mut data[filled..filled + chunk])
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    CacheError::TruncatedEntry {
                        path: path.to_path_buf(),
                        expected: size as u64,
                        read: filled as u64,
                    }
                } else {
                    CacheError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
            })?;
        filled += chunk;
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::test_support::LOCALE_LOCK;
    use std::ffi::CStr;

    fn make_cache() -> (tempfile::TempDir, FileBlobCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileBlobCache::new(dir.path());
        (dir, cache)
    }

    fn write_bytes(cache: &FileBlobCache, id: &str, bytes: &[u8]) {
        cache
            .write_entry(id, &mut |out| out.write_all(bytes))
            .unwrap();
    }

    fn read_bytes(cache: &FileBlobCache, id: &str) -> Option<Vec<u8>> {
        let mut loaded = None;
        let hit = cache
            .read_entry(id, &mut |input| {
                let mut bytes = Vec::new();
                input.read_to_end(&mut bytes)?;
                loaded = Some(bytes);
                Ok(())
            })
            .unwrap();
        assert_eq!(hit, loaded.is_some());
        loaded
    }

    #[test]
    fn write_read_roundtrip() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        let blob = b"compiled model payload";
        let id = basalt_common::ContentHash::from_bytes(b"source model").to_string();

        write_bytes(&cache, &id, blob);
        assert_eq!(read_bytes(&cache, &id).unwrap(), blob);
    }

    #[test]
    fn miss_never_invokes_reader() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        let mut invoked = 0;
        let hit = cache
            .read_entry("absent", &mut |_| {
                invoked += 1;
                Ok(())
            })
            .unwrap();
        assert!(!hit);
        assert_eq!(invoked, 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        write_bytes(&cache, "gone", b"bytes");

        cache.remove_entry("gone").unwrap();
        // Second removal of an absent entry is a no-op, not an error.
        cache.remove_entry("gone").unwrap();
        assert!(read_bytes(&cache, "gone").is_none());
    }

    #[test]
    fn overwrite_replaces_entry_completely() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        // First payload is longer than the second, so a partial overwrite
        // would leave a detectable mixture.
        write_bytes(&cache, "model", b"first version, quite long");
        write_bytes(&cache, "model", b"v2");
        assert_eq!(read_bytes(&cache, "model").unwrap(), b"v2");
    }

    #[test]
    fn non_ascii_identifier_roundtrip() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        write_bytes(&cache, "модель-β", b"unicode path bytes");
        assert_eq!(
            read_bytes(&cache, "модель-β").unwrap(),
            b"unicode path bytes"
        );
    }

    #[test]
    fn failing_writer_surfaces_as_stream_error() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        let err = cache
            .write_entry("bad", &mut |_| {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "serializer failed",
                ))
            })
            .unwrap_err();
        assert!(matches!(err, CacheError::Stream { .. }));
    }

    #[test]
    fn failing_reader_surfaces_as_stream_error() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        write_bytes(&cache, "entry", b"bytes");
        let err = cache
            .read_entry("entry", &mut |_| {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "deserializer failed",
                ))
            })
            .unwrap_err();
        assert!(matches!(err, CacheError::Stream { .. }));
    }

    #[test]
    fn blob_path_format() {
        let (_dir, cache) = make_cache();
        let path = cache.blob_path("abc123");
        assert!(path.ends_with("abc123.blob"));
    }

    #[test]
    fn chunked_read_spans_chunk_boundaries() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();

        // 3.5 chunks at a small test chunk size.
        let chunk = 64 * 1024;
        let payload: Vec<u8> = (0..chunk * 7 / 2).map(|i| (i % 251) as u8).collect();
        write_bytes(&cache, "large", &payload);

        let loaded = read_file_chunked(&cache.blob_path("large"), chunk).unwrap();
        assert_eq!(loaded, payload);
    }

    #[test]
    fn chunked_read_of_small_file() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        write_bytes(&cache, "small", b"tiny");
        let loaded = read_file_chunked(&cache.blob_path("small"), 64 * 1024).unwrap();
        assert_eq!(loaded, b"tiny");
    }

    #[test]
    fn empty_entry_roundtrip() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        write_bytes(&cache, "empty", b"");
        assert_eq!(read_bytes(&cache, "empty").unwrap(), b"");
    }

    #[test]
    fn chunked_read_missing_file_is_io_error() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        let err = read_file_chunked(&cache.blob_path("nope"), 1024).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn locale_survives_write_and_read() {
        let _serial = LOCALE_LOCK.lock().unwrap();

        // Hosts without an alternate locale installed can't exercise this;
        // skip rather than fail.
        let installed = unsafe {
            !libc::setlocale(libc::LC_ALL, c"de_DE.UTF-8".as_ptr()).is_null()
                || !libc::setlocale(libc::LC_ALL, c"de_DE.utf8".as_ptr()).is_null()
        };
        if !installed {
            return;
        }
        let active = unsafe {
            CStr::from_ptr(libc::setlocale(libc::LC_ALL, std::ptr::null()))
                .to_string_lossy()
                .into_owned()
        };

        let (_dir, cache) = make_cache();
        cache
            .write_entry("metadata", &mut |out| {
                // Locale-sensitive numeric text: must land as "0.50"
                // regardless of the surrounding locale.
                write!(out, "scale={:.2}", 0.5f64)
            })
            .unwrap();
        let mut body = String::new();
        cache
            .read_entry("metadata", &mut |input| {
                input.read_to_string(&mut body).map(|_| ())
            })
            .unwrap();
        assert_eq!(body, "scale=0.50");

        // The overridden locale is back in force after both operations.
        let after = unsafe {
            CStr::from_ptr(libc::setlocale(libc::LC_ALL, std::ptr::null()))
                .to_string_lossy()
                .into_owned()
        };
        assert_eq!(after, active);

        unsafe {
            libc::setlocale(libc::LC_ALL, c"C".as_ptr());
        }
    }

    #[test]
    fn usable_through_trait_object() {
        let _serial = LOCALE_LOCK.lock().unwrap();
        let (_dir, cache) = make_cache();
        let manager: &dyn CacheManager = &cache;

        manager
            .write_entry("dyn", &mut |out| out.write_all(b"via trait"))
            .unwrap();
        let mut loaded = Vec::new();
        let hit = manager
            .read_entry("dyn", &mut |input| {
                input.read_to_end(&mut loaded).map(|_| ())
            })
            .unwrap();
        assert!(hit);
        assert_eq!(loaded, b"via trait");
        manager.remove_entry("dyn").unwrap();
    }
}
