use yag_types::ObjectId;

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {id}")]
    NotFound { id: ObjectId },

    /// The frame header is broken, the declared size disagrees with the
    /// payload, or the stored bytes do not decompress.
    #[error("malformed object{}: {reason}", fmt_id("", .id))]
    MalformedObject {
        id: Option<ObjectId>,
        reason: String,
    },

    /// The frame carries a type tag outside {blob, commit, tree, tag}.
    #[error("unknown type {tag:?}{}", fmt_id(" for object", .id))]
    UnknownObjectType { tag: String, id: Option<ObjectId> },

    /// A typed accessor was handed an object of a different kind.
    #[error("object {id} is a {actual}, expected {expected}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: content hashes to {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Attach an object id to a codec error that was raised without one.
    pub fn with_id(self, object: ObjectId) -> Self {
        match self {
            Self::MalformedObject { id: None, reason } => Self::MalformedObject {
                id: Some(object),
                reason,
            },
            Self::UnknownObjectType { tag, id: None } => Self::UnknownObjectType {
                tag,
                id: Some(object),
            },
            other => other,
        }
    }
}

fn fmt_id(label: &str, id: &Option<ObjectId>) -> String {
    id.map(|id| format!("{label} {id}")).unwrap_or_default()
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
