//! Content-addressed object storage for yag.
//!
//! Every object (blob, commit, tree, tag) is stored as an immutable frame
//! `<tag> <len>\0<payload>`, identified by the SHA-1 of that frame and kept
//! zlib-compressed under `objects/<2 hex>/<38 hex>`.
//!
//! # Modules
//!
//! - [`codec`] -- frame encoding and strict decoding
//! - [`object`] -- the closed set of object kinds and their variants
//! - [`ObjectStore`] -- the storage trait
//! - [`LooseObjectStore`] -- one compressed file per object
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. An unknown type tag is an error, never a blob.
//! 3. A declared size that disagrees with the payload is corruption.
//! 4. Writes land via temp file + rename; readers never see partial objects.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod loose;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use object::{Blob, Commit, Object, ObjectKind, ObjectVariant, StoredObject, Tag, Tree};
pub use traits::ObjectStore;
