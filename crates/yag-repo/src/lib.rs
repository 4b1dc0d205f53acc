//! Repository layout for yag.
//!
//! A repository is a worktree with a `.yag` metadata directory holding the
//! object store, refs, `HEAD`, `description` and `config`. This crate creates
//! and opens that skeleton, enforces the format version recorded in the
//! config, locates repositories by walking up from a path, and resolves
//! human-supplied object names to ids.
//!
//! # Key Types
//!
//! - [`Repository`] -- an opened repository and its object read/write entry points
//! - [`RepositoryConfig`] -- the `[core]` config section
//! - [`resolve()`] -- object-name resolution
//! - [`RepoError`] -- every failure, with the path, id or name it concerns

pub mod config;
pub mod error;
pub mod layout;
pub mod names;
pub mod resolve;

pub use config::{CoreConfig, RepositoryConfig, SUPPORTED_FORMAT_VERSION};
pub use error::{RepoError, RepoResult};
pub use layout::{Repository, META_DIR};
pub use resolve::{read_ref, resolve};
