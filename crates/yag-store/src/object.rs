use std::str::FromStr;

use serde::{Deserialize, Serialize};
use yag_crypto::ContentHasher;
use yag_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
///
/// The set is closed: a frame whose tag is not one of these is rejected with
/// [`StoreError::UnknownObjectType`], never read as a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Snapshot pointer with parents and metadata.
    Commit,
    /// Directory listing.
    Tree,
    /// Annotated tag.
    Tag,
}

impl ObjectKind {
    /// Every kind, in tag order.
    pub const ALL: [ObjectKind; 4] = [Self::Blob, Self::Commit, Self::Tree, Self::Tag];

    /// The ASCII tag written into the frame header.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Tag => "tag",
        }
    }

    /// Map a frame tag back to a kind. `None` for anything outside the set.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(Self::Blob),
            b"commit" => Some(Self::Commit),
            b"tree" => Some(Self::Tree),
            b"tag" => Some(Self::Tag),
            _ => None,
        }
    }

    /// The frame-prefixing hasher for this kind.
    pub fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Commit => &ContentHasher::COMMIT,
            Self::Tree => &ContentHasher::TREE,
            Self::Tag => &ContentHasher::TAG,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s.as_bytes()).ok_or_else(|| StoreError::UnknownObjectType {
            tag: s.to_string(),
            id: None,
        })
    }
}

/// A stored object: kind tag + payload + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload; it is a pure key-value store keyed by the hash of the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes, as recorded in the frame header.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }
}

/// Capabilities shared by every object kind: a fixed tag, and conversion
/// between the semantic form and payload bytes.
///
/// Payloads are carried opaquely; a variant's payload is exactly the bytes it
/// was built from.
pub trait ObjectVariant: Sized {
    /// The kind written into the frame header.
    const KIND: ObjectKind;

    /// Build the variant from payload bytes.
    fn from_payload(data: Vec<u8>) -> Self;

    /// The payload bytes this variant serializes to.
    fn payload(&self) -> &[u8];

    /// Convert into a `StoredObject` for storage.
    fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(Self::KIND, self.payload().to_vec())
    }

    /// Decode from a `StoredObject`, rejecting other kinds.
    fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != Self::KIND {
            return Err(StoreError::KindMismatch {
                id: obj.compute_id(),
                expected: Self::KIND,
                actual: obj.kind,
            });
        }
        Ok(Self::from_payload(obj.data.clone()))
    }
}

macro_rules! opaque_variant {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub data: Vec<u8>,
        }

        impl $name {
            pub fn new(data: Vec<u8>) -> Self {
                Self { data }
            }
        }

        impl ObjectVariant for $name {
            const KIND: ObjectKind = $kind;

            fn from_payload(data: Vec<u8>) -> Self {
                Self { data }
            }

            fn payload(&self) -> &[u8] {
                &self.data
            }
        }
    };
}

opaque_variant!(
    /// Raw content object.
    Blob => ObjectKind::Blob
);
opaque_variant!(
    /// Commit object, payload kept verbatim.
    Commit => ObjectKind::Commit
);
opaque_variant!(
    /// Tree object, payload kept verbatim.
    Tree => ObjectKind::Tree
);
opaque_variant!(
    /// Annotated tag object, payload kept verbatim.
    Tag => ObjectKind::Tag
);

/// Any object, dispatched on its kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Commit(Commit),
    Tree(Tree),
    Tag(Tag),
}

impl Object {
    /// Build the variant matching `kind` around `data`.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        match kind {
            ObjectKind::Blob => Self::Blob(Blob::from_payload(data)),
            ObjectKind::Commit => Self::Commit(Commit::from_payload(data)),
            ObjectKind::Tree => Self::Tree(Tree::from_payload(data)),
            ObjectKind::Tag => Self::Tag(Tag::from_payload(data)),
        }
    }

    /// Dispatch a stored object to its variant.
    pub fn from_stored(obj: StoredObject) -> Self {
        Self::new(obj.kind, obj.data)
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Blob(o) => o.payload(),
            Self::Commit(o) => o.payload(),
            Self::Tree(o) => o.payload(),
            Self::Tag(o) => o.payload(),
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(self.kind(), self.payload().to_vec())
    }

    /// Content-addressed ID of this object.
    pub fn compute_id(&self) -> ObjectId {
        self.kind().hasher().hash(self.payload())
    }
}

impl From<StoredObject> for Object {
    fn from(obj: StoredObject) -> Self {
        Self::from_stored(obj)
    }
}
