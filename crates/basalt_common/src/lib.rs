//! Shared leaf types for the Basalt runtime.
//!
//! Currently just [`ContentHash`], which producers use to derive stable
//! cache identifiers from model bytes.

#![warn(missing_docs)]

pub mod hash;

pub use hash::ContentHash;
