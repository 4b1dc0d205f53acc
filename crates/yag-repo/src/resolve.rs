//! Object-name resolution.
//!
//! Turns a user-supplied name into a full object id. Accepted forms:
//! - a full 40-hex id, passed through as-is
//! - `HEAD` or a full ref path (`refs/heads/master`), read as a loose ref
//! - an abbreviated id of at least [`MIN_ABBREV`] hex characters
//! - a short tag or branch name, looked up under `refs/tags/` and `refs/heads/`
//!
//! Short forms are gathered together; more than one distinct match is
//! ambiguous. Tags and commits are not peeled.

use std::fs;
use std::io;

use tracing::debug;
use yag_store::ObjectKind;
use yag_types::{ObjectId, HEX_LEN};

use crate::error::{RepoError, RepoResult};
use crate::layout::Repository;
use crate::names::{validate_full_ref, validate_ref_name};

/// Shortest abbreviated id accepted.
pub const MIN_ABBREV: usize = 4;

const SYMREF_PREFIX: &str = "ref: ";
const MAX_SYMREF_DEPTH: usize = 5;

/// Resolve `name` to an object id, optionally requiring the object to be of
/// kind `expected`.
///
/// Without a type filter a full id is returned even if no such object is
/// stored. With a filter the object is read, so it must exist.
pub fn resolve(
    repo: &Repository,
    name: &str,
    expected: Option<ObjectKind>,
) -> RepoResult<ObjectId> {
    let id = resolve_name(repo, name)?;
    if let Some(expected) = expected {
        let actual = repo.read_object(&id)?.kind();
        if actual != expected {
            return Err(RepoError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual,
            });
        }
    }
    debug!(name, id = %id, "resolved object name");
    Ok(id)
}

fn resolve_name(repo: &Repository, name: &str) -> RepoResult<ObjectId> {
    let not_found = || RepoError::ReferenceNotFound {
        name: name.to_string(),
    };

    if name.len() == HEX_LEN && is_hex(name) {
        return ObjectId::from_hex(&name.to_ascii_lowercase()).map_err(|_| not_found());
    }
    if name == "HEAD" || name.starts_with("refs/") {
        return read_ref(repo, name)?.ok_or_else(not_found);
    }

    let mut candidates = Vec::new();
    if name.len() >= MIN_ABBREV && is_hex(name) {
        candidates.extend(repo.objects().ids_with_prefix(&name.to_ascii_lowercase())?);
    }
    if validate_ref_name(name).is_ok() {
        for namespace in ["refs/tags", "refs/heads"] {
            if let Some(id) = read_ref(repo, &format!("{namespace}/{name}"))? {
                candidates.push(id);
            }
        }
    }
    candidates.sort();
    candidates.dedup();

    match candidates.len() {
        0 => Err(not_found()),
        1 => Ok(candidates[0]),
        _ => Err(RepoError::AmbiguousReference {
            name: name.to_string(),
            candidates,
        }),
    }
}

/// Read a loose ref (`HEAD` or `refs/...`), following symbolic refs.
///
/// Returns `Ok(None)` if the ref, or a ref it points to, does not exist yet
/// (an unborn branch).
pub fn read_ref(repo: &Repository, path: &str) -> RepoResult<Option<ObjectId>> {
    let mut current = path.to_string();
    for _ in 0..=MAX_SYMREF_DEPTH {
        if current != "HEAD" {
            validate_full_ref(&current)?;
        }
        let parts: Vec<&str> = current.split('/').collect();
        let file = repo.meta_path(&parts);
        // A ref namespace such as `refs/heads/feature` is not itself a ref.
        if file.is_dir() {
            return Ok(None);
        }
        let contents = match fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let contents = contents.trim();

        if let Some(target) = contents.strip_prefix(SYMREF_PREFIX) {
            debug!(from = %current, to = target, "following symbolic ref");
            current = target.trim().to_string();
            continue;
        }
        return ObjectId::from_hex(contents)
            .map(Some)
            .map_err(|e| RepoError::InvalidRefName {
                name: current.clone(),
                reason: format!("does not hold an object id: {e}"),
            });
    }
    Err(RepoError::InvalidRefName {
        name: path.to_string(),
        reason: format!("more than {MAX_SYMREF_DEPTH} levels of symbolic refs"),
    })
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yag_store::{Object, StoreError};

    fn temp_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        (dir, repo)
    }

    fn put(repo: &Repository, kind: ObjectKind, data: &[u8]) -> ObjectId {
        repo.write_object(&Object::new(kind, data.to_vec()), true)
            .unwrap()
    }

    fn write_ref(repo: &Repository, path: &str, contents: &str) {
        let parts: Vec<&str> = path.split('/').collect();
        let file = repo.meta_path(&parts);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, contents).unwrap();
    }

    #[test]
    fn full_id_passes_through() {
        let (_dir, repo) = temp_repo();
        let id = ObjectId::from_bytes(b"not stored");
        assert_eq!(resolve(&repo, &id.to_hex(), None).unwrap(), id);
        assert_eq!(
            resolve(&repo, &id.to_hex().to_uppercase(), None).unwrap(),
            id
        );
    }

    #[test]
    fn full_id_with_type_filter() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Blob, b"hello\n");
        assert_eq!(
            resolve(&repo, &id.to_hex(), Some(ObjectKind::Blob)).unwrap(),
            id
        );
        let err = resolve(&repo, &id.to_hex(), Some(ObjectKind::Tree)).unwrap_err();
        assert!(matches!(
            err,
            RepoError::TypeMismatch {
                expected: ObjectKind::Tree,
                actual: ObjectKind::Blob,
                ..
            }
        ));
    }

    #[test]
    fn type_filter_on_missing_object() {
        let (_dir, repo) = temp_repo();
        let id = ObjectId::from_bytes(b"absent");
        let err = resolve(&repo, &id.to_hex(), Some(ObjectKind::Blob)).unwrap_err();
        assert!(matches!(err, RepoError::Store(StoreError::NotFound { .. })));
    }

    #[test]
    fn abbreviated_id() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Blob, b"hello\n");
        assert_eq!(resolve(&repo, &id.to_hex()[..7], None).unwrap(), id);
        assert_eq!(resolve(&repo, "CE0136", None).unwrap(), id);
    }

    #[test]
    fn too_short_abbreviation_is_not_found() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Blob, b"hello\n");
        let err = resolve(&repo, &id.to_hex()[..3], None).unwrap_err();
        assert!(matches!(err, RepoError::ReferenceNotFound { .. }));
    }

    #[test]
    fn branch_and_head() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Commit, b"tree x\n");
        write_ref(&repo, "refs/heads/master", &format!("{id}\n"));

        assert_eq!(resolve(&repo, "master", None).unwrap(), id);
        assert_eq!(resolve(&repo, "HEAD", Some(ObjectKind::Commit)).unwrap(), id);
        assert_eq!(resolve(&repo, "refs/heads/master", None).unwrap(), id);
    }

    #[test]
    fn tag_lookup() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Tag, b"object x\n");
        write_ref(&repo, "refs/tags/v1.0", &format!("{id}\n"));
        assert_eq!(resolve(&repo, "v1.0", Some(ObjectKind::Tag)).unwrap(), id);
    }

    #[test]
    fn same_name_for_tag_and_branch_is_ambiguous() {
        let (_dir, repo) = temp_repo();
        let a = put(&repo, ObjectKind::Commit, b"a");
        let b = put(&repo, ObjectKind::Commit, b"b");
        write_ref(&repo, "refs/heads/release", &a.to_hex());
        write_ref(&repo, "refs/tags/release", &b.to_hex());

        match resolve(&repo, "release", None).unwrap_err() {
            RepoError::AmbiguousReference { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn same_target_is_not_ambiguous() {
        let (_dir, repo) = temp_repo();
        let a = put(&repo, ObjectKind::Commit, b"a");
        write_ref(&repo, "refs/heads/release", &a.to_hex());
        write_ref(&repo, "refs/tags/release", &a.to_hex());
        assert_eq!(resolve(&repo, "release", None).unwrap(), a);
    }

    #[test]
    fn unborn_head_is_not_found() {
        let (_dir, repo) = temp_repo();
        assert!(read_ref(&repo, "HEAD").unwrap().is_none());
        let err = resolve(&repo, "HEAD", None).unwrap_err();
        assert!(matches!(err, RepoError::ReferenceNotFound { ref name } if name == "HEAD"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let (_dir, repo) = temp_repo();
        for name in ["", "nope", "../config", "deadbeef"] {
            let err = resolve(&repo, name, None).unwrap_err();
            assert!(matches!(err, RepoError::ReferenceNotFound { .. }), "{name:?}");
        }
    }

    #[test]
    fn ref_namespace_directory_is_not_found() {
        let (_dir, repo) = temp_repo();
        let id = put(&repo, ObjectKind::Commit, b"auth work");
        write_ref(&repo, "refs/heads/feature/auth", &id.to_hex());

        assert!(read_ref(&repo, "refs/heads/feature").unwrap().is_none());
        for name in ["feature", "refs/heads", "refs/heads/feature"] {
            let err = resolve(&repo, name, None).unwrap_err();
            assert!(matches!(err, RepoError::ReferenceNotFound { .. }), "{name:?}");
        }
        assert_eq!(resolve(&repo, "feature/auth", None).unwrap(), id);
    }

    #[test]
    fn symbolic_loop_is_rejected() {
        let (_dir, repo) = temp_repo();
        write_ref(&repo, "refs/heads/a", "ref: refs/heads/b\n");
        write_ref(&repo, "refs/heads/b", "ref: refs/heads/a\n");
        let err = read_ref(&repo, "refs/heads/a").unwrap_err();
        assert!(matches!(err, RepoError::InvalidRefName { .. }));
    }

    #[test]
    fn garbage_ref_is_rejected() {
        let (_dir, repo) = temp_repo();
        write_ref(&repo, "refs/heads/broken", "not an id\n");
        let err = resolve(&repo, "broken", None).unwrap_err();
        assert!(matches!(err, RepoError::InvalidRefName { .. }));
    }
}
