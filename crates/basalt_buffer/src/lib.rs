//! Zero-copy, ownership-safe views over large binary buffers.
//!
//! Model blobs loaded from the cache, from memory-mapped files, or from
//! asynchronous decode pipelines are handed around as buffer views rather
//! than copies. All variants share the read-only [`Buffer`] contract but
//! differ in how and when their bytes become valid: [`OwnedBuffer`] owns an
//! allocation outright, [`ExternallyOwnedBuffer`] keeps someone else's
//! allocation reachable for exactly as long as the view lives, and
//! [`LazyAsyncBuffer`] materializes once, on first access, from a producer
//! that may still be working when the handle is created.
//!
//! [`CursorReader`] is the companion forward-only cursor for picking blob
//! header metadata out of such a view.

#![warn(missing_docs)]

pub mod buffer;
pub mod cursor;
pub mod lazy;
pub mod shared;

pub use buffer::{Buffer, OwnedBuffer};
pub use cursor::CursorReader;
pub use lazy::{AsyncBlobSource, LazyAsyncBuffer};
pub use shared::{map_file, ExternallyOwnedBuffer};
