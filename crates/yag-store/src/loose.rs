use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;
use yag_types::{ObjectId, HEX_LEN};

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Loose object store: one zlib-compressed frame per file.
///
/// Layout under the objects directory:
/// ```text
/// objects/
///   ce/
///     013625030ba8dba906f756967f9e9ca394464a
/// ```
/// The first two hex characters of the id name the fan-out directory and
/// the remaining 38 name the file.
///
/// Writes go to a temporary file in the fan-out directory which is then
/// renamed into place, so a concurrent reader never observes a partial
/// object.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at an existing `objects/` directory.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects_dir: objects_dir.into(),
        }
    }

    /// The directory this store reads from and writes into.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fan_out();
        self.objects_dir.join(dir).join(file)
    }

    /// All stored ids whose hex form starts with `prefix`, sorted.
    ///
    /// `prefix` must be at least two lowercase hex characters; shorter
    /// prefixes would require scanning every fan-out directory and return
    /// nothing.
    pub fn ids_with_prefix(&self, prefix: &str) -> StoreResult<Vec<ObjectId>> {
        if prefix.len() < 2 || prefix.len() > HEX_LEN {
            return Ok(Vec::new());
        }
        let (dir, rest) = prefix.split_at(2);
        let fan_out = self.objects_dir.join(dir);
        let entries = match fs::read_dir(&fan_out) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(rest) {
                continue;
            }
            // Temp files and anything else that is not an object name.
            if let Ok(id) = ObjectId::from_hex(&format!("{dir}{name}")) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn write_compressed(&self, path: &Path, frame: &[u8]) -> StoreResult<()> {
        let parent = path.parent().unwrap_or(&self.objects_dir);
        fs::create_dir_all(parent)?;

        let tmp = tempfile::NamedTempFile::new_in(parent)?;
        let mut encoder = ZlibEncoder::new(tmp, Compression::default());
        encoder.write_all(frame)?;
        let tmp = encoder.finish()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut frame = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut frame)
            .map_err(|e| StoreError::MalformedObject {
                id: Some(*id),
                reason: format!("decompression failed: {e}"),
            })?;

        let obj = codec::decode(&frame).map_err(|e| e.with_id(*id))?;
        if !obj.kind.hasher().verify(&obj.data, id) {
            return Err(StoreError::HashMismatch {
                id: *id,
                computed: obj.compute_id(),
            });
        }
        debug!(id = %id, kind = %obj.kind, size = obj.size, "read loose object");
        Ok(Some(obj))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let frame = codec::encode(object);
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.exists() {
            debug!(id = %id, "loose object already present, skipping write");
            return Ok(id);
        }
        self.write_compressed(&path, &frame)?;
        debug!(id = %id, kind = %object.kind, size = object.size, "wrote loose object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
