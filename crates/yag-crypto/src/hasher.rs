use sha1::{Digest, Sha1};
use yag_types::ObjectId;

/// Frame-prefixing SHA-1 content hasher.
///
/// Each hasher carries an object type tag (`"blob"`, `"tree"`, ...). Hashing a
/// payload feeds the frame header `<tag> <len>\0` into the digest ahead of the
/// payload, so the result is the id of the full frame. A blob and a tree with
/// identical payload bytes therefore hash differently.
pub struct ContentHasher {
    tag: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { tag: "blob" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self { tag: "commit" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { tag: "tree" };
    /// Hasher for tag objects.
    pub const TAG: Self = Self { tag: "tag" };

    /// Hash a payload as a framed object of this hasher's type.
    pub fn hash(&self, payload: &[u8]) -> ObjectId {
        let mut hasher = Sha1::new();
        hasher.update(self.tag.as_bytes());
        hasher.update(b" ");
        hasher.update(payload.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(payload);
        ObjectId::from_hash(hasher.finalize().into())
    }

    /// Hash already-framed bytes (header included).
    pub fn hash_frame(frame: &[u8]) -> ObjectId {
        ObjectId::from_bytes(frame)
    }

    /// Verify that a payload produces the expected object ID.
    pub fn verify(&self, payload: &[u8], expected: &ObjectId) -> bool {
        self.hash(payload) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        let id1 = ContentHasher::BLOB.hash(data);
        let id2 = ContentHasher::BLOB.hash(data);
        assert_eq!(id1, id2);
    }

    #[test]
    fn blob_hash_matches_git() {
        // `printf 'hello\n' | git hash-object --stdin`
        let id = ContentHasher::BLOB.hash(b"hello\n");
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn empty_blob_matches_git() {
        let id = ContentHasher::BLOB.hash(b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn different_tags_produce_different_hashes() {
        let data = b"same content";
        let blob = ContentHasher::BLOB.hash(data);
        let tree = ContentHasher::TREE.hash(data);
        let commit = ContentHasher::COMMIT.hash(data);
        let tag = ContentHasher::TAG.hash(data);
        assert_ne!(blob, tree);
        assert_ne!(blob, commit);
        assert_ne!(tree, commit);
        assert_ne!(commit, tag);
    }

    #[test]
    fn hash_equals_hash_of_frame() {
        let payload = b"framed";
        let frame = b"blob 6\0framed";
        assert_eq!(
            ContentHasher::BLOB.hash(payload),
            ContentHasher::hash_frame(frame)
        );
    }

    #[test]
    fn verify_correct_and_tampered() {
        let id = ContentHasher::BLOB.hash(b"original");
        assert!(ContentHasher::BLOB.verify(b"original", &id));
        assert!(!ContentHasher::BLOB.verify(b"tampered", &id));
        assert!(!ContentHasher::TREE.verify(b"original", &id));
    }

    proptest! {
        #[test]
        fn distinct_payloads_distinct_ids(a in proptest::collection::vec(any::<u8>(), 0..256),
                                          b in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assume!(a != b);
            prop_assert_ne!(ContentHasher::BLOB.hash(&a), ContentHasher::BLOB.hash(&b));
        }
    }
}
