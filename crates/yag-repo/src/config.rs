//! Repository configuration.
//!
//! Persisted as `<meta>/config`. The rendered form is both TOML and a valid
//! INI/git-config document:
//! ```text
//! [core]
//! repositoryformatversion = 0
//! filemode = false
//! bare = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};
use crate::layout::write_atomic;

/// The only repository format version this build reads.
pub const SUPPORTED_FORMAT_VERSION: i64 = 0;

/// Top-level repository config. Sections other than `[core]` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub core: CoreConfig,
}

/// The `[core]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// On-disk format version; must equal [`SUPPORTED_FORMAT_VERSION`].
    /// Read as a full TOML integer so that any other value, negative or huge,
    /// reaches the version check instead of failing to parse.
    pub repositoryformatversion: i64,
    /// Whether the executable bit of worktree files is tracked.
    #[serde(default)]
    pub filemode: bool,
    /// Whether the repository has no worktree.
    #[serde(default)]
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repositoryformatversion: SUPPORTED_FORMAT_VERSION,
            filemode: false,
            bare: false,
        }
    }
}

impl RepositoryConfig {
    /// Parse config text. `path` is only used for diagnostics.
    ///
    /// Lines starting with `;` are INI comments and are read as `#` comments.
    pub fn from_text(text: &str, path: &Path) -> RepoResult<Self> {
        toml::from_str(&ini_comments_to_toml(text)).map_err(|e| RepoError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }

    /// Render config text.
    pub fn to_text(&self) -> RepoResult<String> {
        toml::to_string(self).map_err(|e| RepoError::InvalidConfig {
            path: Default::default(),
            reason: e.to_string(),
        })
    }

    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> RepoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RepoError::NotARepository {
                path: path.to_path_buf(),
                reason: "configuration file missing".into(),
            },
            _ => RepoError::Io(e),
        })?;
        Self::from_text(&text, path)
    }

    /// Write the config file atomically.
    pub fn save(&self, path: &Path) -> RepoResult<()> {
        write_atomic(path, self.to_text()?.as_bytes())
    }

    /// Fail unless the format version is one this build understands.
    pub fn check_format_version(&self, path: &Path) -> RepoResult<()> {
        let version = self.core.repositoryformatversion;
        if version != SUPPORTED_FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion {
                path: path.to_path_buf(),
                version,
            });
        }
        Ok(())
    }
}

fn ini_comments_to_toml(text: &str) -> String {
    text.lines()
        .map(|line| {
            let body = line.trim_start();
            match body.strip_prefix(';') {
                Some(comment) => format!("{}#{comment}", &line[..line.len() - body.len()]),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
