//! Error types for repository operations.

use std::path::PathBuf;

use thiserror::Error;
use yag_store::{ObjectKind, StoreError};
use yag_types::ObjectId;

/// Errors that can occur while opening, creating, or querying a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The metadata directory or its config is missing.
    #[error("not a yag repository: {}: {reason}", .path.display())]
    NotARepository { path: PathBuf, reason: String },

    /// The config declares a format version this build cannot read.
    #[error("unsupported repositoryformatversion {version} in {}", .path.display())]
    UnsupportedFormatVersion { path: PathBuf, version: i64 },

    /// `create` found an existing, non-empty metadata directory.
    #[error("repository directory is not empty: {}", .path.display())]
    RepositoryNotEmpty { path: PathBuf },

    /// A file sits where the layout needs a directory.
    #[error("not a directory: {}", .path.display())]
    PathIsNotDirectory { path: PathBuf },

    /// The config file exists but cannot be parsed.
    #[error("invalid config {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    /// No object or ref matches the name.
    #[error("no object named {name:?}")]
    ReferenceNotFound { name: String },

    /// The name matches more than one object.
    #[error("ambiguous name {name:?}: matches {}", fmt_ids(.candidates))]
    AmbiguousReference {
        name: String,
        candidates: Vec<ObjectId>,
    },

    /// The name resolved, but to an object of another kind.
    #[error("{name:?} is a {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// A ref name fails git-style naming rules.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// Object store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O error on the metadata directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_ids(ids: &[ObjectId]) -> String {
    ids.iter()
        .map(ObjectId::short_hex)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for repository operations.
pub type RepoResult<T> = std::result::Result<T, RepoError>;
