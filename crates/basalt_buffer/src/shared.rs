//! Buffer views over allocations owned by someone else.
//!
//! A model blob is typically loaded (or memory-mapped) as one contiguous
//! allocation and then sliced into several logical sub-buffers consumed by
//! different parts of the runtime. Each sub-buffer must keep the whole
//! allocation alive without copying it; the `Arc` owner token held by every
//! view is what extends the allocation's reachability.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::buffer::Buffer;

/// A buffer whose bytes are kept alive by an external owner token.
///
/// The view holds an `Arc` to the owning allocation (a `Vec<u8>`, a
/// [`memmap2::Mmap`], or any other `AsRef<[u8]>` owner) plus an offset and
/// length into it. The view never allocates or frees the underlying bytes;
/// dropping the last view (and the last outside handle) is what releases
/// the allocation. Many views may share one owner.
#[derive(Clone)]
pub struct ExternallyOwnedBuffer {
    owner: Arc<dyn AsRef<[u8]> + Send + Sync>,
    offset: usize,
    len: usize,
}

impl ExternallyOwnedBuffer {
    /// Creates a view covering the owner's entire allocation.
    pub fn new<O>(owner: Arc<O>) -> Self
    where
        O: AsRef<[u8]> + Send + Sync + 'static,
    {
        let len = (*owner).as_ref().len();
        Self {
            owner,
            offset: 0,
            len,
        }
    }

    /// Creates a view covering `len` bytes starting at `offset` within the
    /// owner's allocation.
    ///
    /// Returns `None` if the range falls outside the allocation.
    pub fn with_range<O>(owner: Arc<O>, offset: usize, len: usize) -> Option<Self>
    where
        O: AsRef<[u8]> + Send + Sync + 'static,
    {
        let total = (*owner).as_ref().len();
        if offset.checked_add(len)? > total {
            return None;
        }
        Some(Self { owner, offset, len })
    }

    /// Creates a sub-view of this view, relative to its own start.
    ///
    /// The sub-view shares the same owner token, so the whole backing
    /// allocation stays alive as long as either view does. Returns `None`
    /// if the range falls outside this view.
    pub fn slice(&self, offset: usize, len: usize) -> Option<Self> {
        if offset.checked_add(len)? > self.len {
            return None;
        }
        Some(Self {
            owner: Arc::clone(&self.owner),
            offset: self.offset + offset,
            len,
        })
    }

    /// Offset of this view within the backing allocation.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Buffer for ExternallyOwnedBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn as_slice(&self) -> &[u8] {
        &(*self.owner).as_ref()[self.offset..self.offset + self.len]
    }
}

/// Memory-maps a file and wraps the mapping as an [`ExternallyOwnedBuffer`].
///
/// The `Mmap` becomes the view's owner token: slicing the returned buffer
/// produces zero-copy sub-views that each keep the mapping alive.
pub fn map_file(path: &Path) -> io::Result<ExternallyOwnedBuffer> {
    let file = File::open(path)?;
    // Safety: the mapping is read-only; callers must not truncate or
    // rewrite the file while views into the mapping are alive.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(ExternallyOwnedBuffer::new(Arc::new(mmap)))
}
