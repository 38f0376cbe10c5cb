//! File-backed caching of compiled model blobs.
//!
//! Compiling a model is expensive; its serialized result is cheap to keep.
//! This crate stores blobs as one file per identifier in a single configured
//! directory, streaming bytes through caller-supplied callbacks so the
//! payload format stays opaque to the cache. Reads of large entries proceed
//! in bounded chunks, and every operation pins the process's numeric locale
//! to `"C"` for its duration because the payload embeds locale-sensitive
//! numeric text.

#![warn(missing_docs)]

pub mod error;
pub mod locale;
pub mod store;

pub use error::CacheError;
pub use locale::ScopedLocale;
pub use store::{CacheManager, FileBlobCache};
