//! Object framing.
//!
//! On-disk format, before compression:
//! ```text
//! <tag ASCII> 0x20 <decimal length ASCII> 0x00 <payload bytes>
//! ```
//! The length must be canonical decimal (no sign, no leading zeros other than
//! a bare `0`) and must equal the number of bytes after the NUL.

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Serialize an object into its frame.
pub fn encode(obj: &StoredObject) -> Vec<u8> {
    let tag = obj.kind.tag().as_bytes();
    let len = obj.data.len().to_string();
    let mut frame = Vec::with_capacity(tag.len() + len.len() + 2 + obj.data.len());
    frame.extend_from_slice(tag);
    frame.push(b' ');
    frame.extend_from_slice(len.as_bytes());
    frame.push(0);
    frame.extend_from_slice(&obj.data);
    frame
}

/// Parse a frame back into an object.
///
/// Framing is validated before the tag is looked up, so a well-formed frame
/// with an unrecognized tag fails with [`StoreError::UnknownObjectType`] and
/// everything else fails with [`StoreError::MalformedObject`]. Errors carry no
/// object id; callers that know one attach it with [`StoreError::with_id`].
pub fn decode(frame: &[u8]) -> StoreResult<StoredObject> {
    let space = frame
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| malformed("missing space after type tag"))?;
    let nul = frame[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|offset| space + offset)
        .ok_or_else(|| malformed("missing NUL after length field"))?;

    let size = parse_length(&frame[space + 1..nul])?;
    let payload = &frame[nul + 1..];
    if payload.len() as u64 != size {
        return Err(malformed(format!(
            "declared size {size} but payload is {} bytes",
            payload.len()
        )));
    }

    let tag = &frame[..space];
    let kind = ObjectKind::from_tag(tag).ok_or_else(|| StoreError::UnknownObjectType {
        tag: String::from_utf8_lossy(tag).into_owned(),
        id: None,
    })?;
    Ok(StoredObject::new(kind, payload.to_vec()))
}

fn parse_length(field: &[u8]) -> StoreResult<u64> {
    let text = std::str::from_utf8(field).map_err(|_| malformed("length field is not ASCII"))?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!("invalid length field {text:?}")));
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err(malformed(format!("non-canonical length field {text:?}")));
    }
    text.parse::<u64>()
        .map_err(|e| malformed(format!("length field {text:?}: {e}")))
}

fn malformed(reason: impl Into<String>) -> StoreError {
    StoreError::MalformedObject {
        id: None,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yag_crypto::ContentHasher;

    fn kind_strategy() -> impl Strategy<Value = ObjectKind> {
        prop_oneof![
            Just(ObjectKind::Blob),
            Just(ObjectKind::Commit),
            Just(ObjectKind::Tree),
            Just(ObjectKind::Tag),
        ]
    }

    #[test]
    fn encode_layout() {
        let obj = StoredObject::new(ObjectKind::Blob, b"hello\n".to_vec());
        assert_eq!(encode(&obj), b"blob 6\0hello\n");
    }

    #[test]
    fn encode_empty_payload() {
        let obj = StoredObject::new(ObjectKind::Tree, Vec::new());
        assert_eq!(encode(&obj), b"tree 0\0");
        assert_eq!(decode(b"tree 0\0").unwrap(), obj);
    }

    #[test]
    fn payload_may_contain_spaces_and_nuls() {
        let obj = StoredObject::new(ObjectKind::Commit, b"a b\0c \0".to_vec());
        assert_eq!(decode(&encode(&obj)).unwrap(), obj);
    }

    #[test]
    fn frame_hash_equals_compute_id() {
        let obj = StoredObject::new(ObjectKind::Tag, b"object abc\n".to_vec());
        assert_eq!(ContentHasher::hash_frame(&encode(&obj)), obj.compute_id());
    }

    #[test]
    fn missing_space_is_malformed() {
        let err = decode(b"blob6\0hello!").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { id: None, .. }));
    }

    #[test]
    fn missing_nul_is_malformed() {
        let err = decode(b"blob 5hello").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn non_numeric_length_is_malformed() {
        let frames: [&[u8]; 5] = [b"blob x\0", b"blob \0", b"blob -1\0", b"blob +1\0a", b"blob 1 \0a"];
        for frame in frames {
            let err = decode(frame).unwrap_err();
            assert!(matches!(err, StoreError::MalformedObject { .. }), "{frame:?}");
        }
    }

    #[test]
    fn leading_zero_length_is_malformed() {
        let err = decode(b"blob 05\0hello").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn overflowing_length_is_malformed() {
        let err = decode(b"blob 99999999999999999999999\0").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn mutated_length_is_malformed() {
        let err = decode(b"blob 7\0hello\n").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
        let err = decode(b"blob 5\0hello\n").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let frame = encode(&StoredObject::new(ObjectKind::Blob, b"hello world".to_vec()));
        let err = decode(&frame[..frame.len() - 3]).unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = decode(b"widget 5\0hello").unwrap_err();
        match err {
            StoreError::UnknownObjectType { tag, id } => {
                assert_eq!(tag, "widget");
                assert!(id.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn framing_is_checked_before_tag() {
        let err = decode(b"widget 9\0hello").unwrap_err();
        assert!(matches!(err, StoreError::MalformedObject { .. }));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(kind in kind_strategy(),
                                 data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let obj = StoredObject::new(kind, data);
            prop_assert_eq!(decode(&encode(&obj)).unwrap(), obj);
        }

        #[test]
        fn id_is_stable(kind in kind_strategy(),
                        data in proptest::collection::vec(any::<u8>(), 0..128)) {
            let obj = StoredObject::new(kind, data);
            prop_assert_eq!(obj.compute_id(), ContentHasher::hash_frame(&encode(&obj)));
            prop_assert_eq!(obj.compute_id(), obj.clone().compute_id());
        }
    }
}
