//! Buffers materialized once, on first access, from an async producer.

use std::sync::Arc;
use std::sync::OnceLock;

use crate::buffer::Buffer;

/// A producer whose bytes become available asynchronously.
///
/// [`bytes`](AsyncBlobSource::bytes) must return the final storage only
/// once the producer's own asynchronous work is complete, blocking until
/// then if necessary, and the returned slice must stay at a stable address
/// for the rest of the producer's lifetime. The buffer does not initiate or
/// await that work itself beyond calling this accessor at materialization
/// time.
pub trait AsyncBlobSource: Send + Sync {
    /// The produced bytes, available only once production is complete.
    fn bytes(&self) -> &[u8];
}

/// Pointer and length pulled from the source exactly once.
struct Materialized {
    ptr: *const u8,
    len: usize,
}

// Safety: the pointer refers to storage pinned by the `Arc`-held source;
// the record itself is written once and never mutated.
unsafe impl Send for Materialized {}
unsafe impl Sync for Materialized {}

/// A buffer whose bytes are not yet available at construction.
///
/// The handle can be created (and cloned across worker threads) while the
/// producer is still populating its data. The first accessor call on any
/// thread pulls the final pointer and length from the source exactly once;
/// every other caller, concurrent or later, observes that same result. The
/// source handle is retained for the buffer's whole lifetime so the
/// materialized pointer stays valid.
pub struct LazyAsyncBuffer {
    source: Arc<dyn AsyncBlobSource>,
    materialized: OnceLock<Materialized>,
}

impl LazyAsyncBuffer {
    /// Creates a lazy buffer over the given producer handle.
    pub fn new(source: Arc<dyn AsyncBlobSource>) -> Self {
        Self {
            source,
            materialized: OnceLock::new(),
        }
    }

    /// Pulls pointer and length from the source, at most once globally.
    ///
    /// `OnceLock` provides both the at-most-once guarantee and the memory
    /// barrier: concurrent first callers block until the one materialization
    /// finishes, then all see the fully initialized record.
    fn materialize(&self) -> &Materialized {
        self.materialized.get_or_init(|| {
            let bytes = self.source.bytes();
            Materialized {
                ptr: bytes.as_ptr(),
                len: bytes.len(),
            }
        })
    }
}

impl Buffer for LazyAsyncBuffer {
    fn len(&self) -> usize {
        self.materialize().len
    }

    fn as_slice(&self) -> &[u8] {
        let m = self.materialize();
        if m.len == 0 {
            return &[];
        }
        // Safety: `source` is alive for `self`'s lifetime and its contract
        // pins the storage `ptr` refers to once production is complete.
        unsafe { std::slice::from_raw_parts(m.ptr, m.len) }
    }
}
