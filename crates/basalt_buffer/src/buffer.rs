//! The shared buffer contract and the owned-copy variant.

/// Read-only sizing and pointer contract shared by all buffer variants.
///
/// A `Buffer` exposes a contiguous byte region that is valid for exactly
/// [`len`](Buffer::len) bytes for as long as the buffer value is alive.
/// Implementations differ only in how the bytes are kept alive, never in
/// how they are read.
pub trait Buffer {
    /// Length of the region in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the region is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The region as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Raw pointer to the start of the region.
    ///
    /// Valid for [`len`](Buffer::len) bytes while the buffer is alive.
    fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }
}

/// A buffer that owns its bytes.
///
/// The plain variant of the family: the allocation lives and dies with the
/// value. Used when blob bytes are produced directly into a fresh
/// allocation, e.g. a cache entry loaded into memory.
pub struct OwnedBuffer {
    data: Vec<u8>,
}

impl OwnedBuffer {
    /// Creates an owned buffer from a byte vector without copying.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Consumes the buffer and returns the underlying vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for OwnedBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl Buffer for OwnedBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
