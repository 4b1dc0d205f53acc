//! Content hashing for yag.
//!
//! Object ids are SHA-1 digests over the object frame
//! (`<tag> <len>\0<payload>`). [`ContentHasher`] produces them without
//! materializing the frame. All crypto wraps the `sha1` crate.

pub mod hasher;

pub use hasher::ContentHasher;
