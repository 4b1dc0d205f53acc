//! Ref name validation following git-style conventions.
//!
//! A short name (`master`, `v1.0`, `feature/auth`) is valid when:
//! - it is non-empty
//! - it has no whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - it has no `..` and no `@{`
//! - no slash-separated component is empty or starts with `.`
//! - it does not end with `/`, `.` or `.lock`
//!
//! Validation runs before a name is joined onto the metadata directory, so a
//! valid name can never escape `refs/`.

use crate::error::{RepoError, RepoResult};

/// Characters that are forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RepoError {
    RepoError::InvalidRefName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a short ref name such as a branch or tag name.
///
/// # Examples
///
/// ```
/// use yag_repo::names::validate_ref_name;
///
/// assert!(validate_ref_name("master").is_ok());
/// assert!(validate_ref_name("feature/auth").is_ok());
/// assert!(validate_ref_name("").is_err());
/// assert!(validate_ref_name("../config").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> RepoResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control()) {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') || name.ends_with('/') {
        return Err(invalid(name, "must not end with '.' or '/'"));
    }
    if name.ends_with(".lock") {
        return Err(invalid(name, "must not end with '.lock'"));
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }
    Ok(())
}

/// Validate a full ref path such as `refs/heads/master`.
pub fn validate_full_ref(path: &str) -> RepoResult<()> {
    match path.strip_prefix("refs/") {
        Some(rest) => validate_ref_name(rest),
        None => Err(invalid(path, "must start with 'refs/'")),
    }
}
