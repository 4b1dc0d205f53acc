//! Foundation types for yag.
//!
//! Every other yag crate depends on `yag-types`. The central type is
//! [`ObjectId`], the 160-bit content address that keys the object store.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, HEX_LEN, ID_LEN};
