use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use yag_store::{LooseObjectStore, Object, ObjectStore};
use yag_types::ObjectId;

use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};

/// Name of the metadata directory inside a worktree.
pub const META_DIR: &str = ".yag";

/// Placeholder written to `description` at creation.
pub const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Initial `HEAD`: a symbolic pointer to the unborn `master` branch.
pub const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

/// Directories created by [`Repository::create`], relative to the metadata
/// directory.
const SKELETON_DIRS: &[&[&str]] = &[
    &["branches"],
    &["objects"],
    &["refs", "tags"],
    &["refs", "heads"],
];

/// An opened repository: a worktree path plus its metadata directory.
///
/// ```text
/// <worktree>/.yag/
///   branches/
///   objects/<xx>/<38 hex>
///   refs/heads/
///   refs/tags/
///   description
///   HEAD
///   config
/// ```
#[derive(Clone, Debug)]
pub struct Repository {
    worktree: PathBuf,
    meta_dir: PathBuf,
    config: RepositoryConfig,
}

impl Repository {
    /// Open the repository whose worktree is `path`.
    ///
    /// Without `force`, the metadata directory and its config must exist and
    /// the config must declare a supported format version. With `force` those
    /// checks are skipped; a config that is present is still read, and an
    /// unreadable one is replaced by the defaults.
    pub fn open(path: impl AsRef<Path>, force: bool) -> RepoResult<Self> {
        let worktree = path.as_ref().to_path_buf();
        let meta_dir = worktree.join(META_DIR);

        if !force && !meta_dir.is_dir() {
            return Err(RepoError::NotARepository {
                path: worktree,
                reason: format!("no {META_DIR} directory"),
            });
        }

        let config_path = meta_dir.join("config");
        let config = if force {
            if config_path.is_file() {
                RepositoryConfig::load(&config_path).unwrap_or_else(|e| {
                    warn!(path = %config_path.display(), error = %e, "ignoring unreadable config");
                    RepositoryConfig::default()
                })
            } else {
                RepositoryConfig::default()
            }
        } else {
            let config = RepositoryConfig::load(&config_path)?;
            config.check_format_version(&config_path)?;
            config
        };

        debug!(worktree = %worktree.display(), force, "opened repository");
        Ok(Self {
            worktree,
            meta_dir,
            config,
        })
    }

    /// Create a new repository with worktree `path`.
    ///
    /// The metadata directory may already exist only if it is empty. Each
    /// file is written atomically, but the operation as a whole is not: a
    /// failure midway leaves whatever was already created in place.
    pub fn create(path: impl AsRef<Path>) -> RepoResult<Self> {
        let mut repo = Self::open(path, true)?;

        if repo.worktree.exists() && !repo.worktree.is_dir() {
            return Err(RepoError::PathIsNotDirectory {
                path: repo.worktree.clone(),
            });
        }
        if repo.meta_dir.exists() {
            if !repo.meta_dir.is_dir() {
                return Err(RepoError::PathIsNotDirectory {
                    path: repo.meta_dir.clone(),
                });
            }
            if fs::read_dir(&repo.meta_dir)?.next().is_some() {
                return Err(RepoError::RepositoryNotEmpty {
                    path: repo.meta_dir.clone(),
                });
            }
        } else {
            fs::create_dir_all(&repo.meta_dir)?;
        }

        for parts in SKELETON_DIRS {
            repo.meta_dir_ensure(parts, true)?;
        }

        write_atomic(&repo.meta_path(&["description"]), DEFAULT_DESCRIPTION.as_bytes())?;
        write_atomic(&repo.meta_path(&["HEAD"]), DEFAULT_HEAD.as_bytes())?;

        repo.config = RepositoryConfig::default();
        repo.config.save(&repo.meta_path(&["config"]))?;

        info!(path = %repo.meta_dir.display(), "initialized empty yag repository");
        Ok(repo)
    }

    /// Find the repository containing `start`, walking up through its
    /// ancestors. Returns `Ok(None)` when no ancestor holds a metadata
    /// directory.
    pub fn discover(start: impl AsRef<Path>) -> RepoResult<Option<Self>> {
        Self::discover_until(start.as_ref(), None)
    }

    /// Like [`Repository::discover`], but a missing repository is an error.
    pub fn discover_required(start: impl AsRef<Path>) -> RepoResult<Self> {
        Self::discover_required_until(start.as_ref(), None)
    }

    /// Walk up from `start`, stopping after `ceiling` (canonical) if given.
    fn discover_until(start: &Path, ceiling: Option<&Path>) -> RepoResult<Option<Self>> {
        let start = fs::canonicalize(start)?;
        for dir in start.ancestors() {
            if dir.join(META_DIR).is_dir() {
                debug!(worktree = %dir.display(), "discovered repository");
                return Self::open(dir, false).map(Some);
            }
            if Some(dir) == ceiling {
                break;
            }
        }
        Ok(None)
    }

    fn discover_required_until(start: &Path, ceiling: Option<&Path>) -> RepoResult<Self> {
        Self::discover_until(start, ceiling)?.ok_or_else(|| RepoError::NotARepository {
            path: start.to_path_buf(),
            reason: format!("no {META_DIR} directory here or in any parent"),
        })
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Path under the metadata directory. Nothing is checked or created.
    pub fn meta_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.meta_dir.clone(), |path, part| path.join(part))
    }

    /// Resolve a directory under the metadata directory.
    ///
    /// Returns `Ok(None)` if it does not exist and `mkdir` is false; creates
    /// it (with parents) if `mkdir` is true. A non-directory at the path is
    /// [`RepoError::PathIsNotDirectory`].
    pub fn meta_dir_ensure(&self, parts: &[&str], mkdir: bool) -> RepoResult<Option<PathBuf>> {
        let path = self.meta_path(parts);
        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            return Err(RepoError::PathIsNotDirectory { path });
        }
        if !mkdir {
            return Ok(None);
        }
        fs::create_dir_all(&path)?;
        Ok(Some(path))
    }

    /// The loose object store under `objects/`.
    pub fn objects(&self) -> LooseObjectStore {
        LooseObjectStore::new(self.meta_path(&["objects"]))
    }

    /// Compute an object's id, storing the object only when `persist` is set.
    pub fn write_object(&self, object: &Object, persist: bool) -> RepoResult<ObjectId> {
        if !persist {
            return Ok(object.compute_id());
        }
        let id = self.objects().write(&object.to_stored_object())?;
        Ok(id)
    }

    /// Read and dispatch the object stored under `id`.
    pub fn read_object(&self, id: &ObjectId) -> RepoResult<Object> {
        let stored = self.objects().get(id)?;
        Ok(Object::from_stored(stored))
    }
}

/// Write `contents` to `path` through a sibling temp file and a rename, so
/// the file is either fully written or absent.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> RepoResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| RepoError::Io(e.error))?;
    Ok(())
}
