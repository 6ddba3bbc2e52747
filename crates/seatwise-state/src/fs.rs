//! Filesystem-backed snapshot store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::schema::RosterSnapshot;
use crate::storage_traits::{ContentDigest, SnapshotStore, StorageResult};

/// Stores the roster snapshot as a single pretty-printed JSON file.
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so the file on disk is always either the old or the new snapshot.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    path: PathBuf,
}

impl FsSnapshotStore {
    /// Create a store writing to `path`. Parent directories are created on
    /// first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_snapshot(path: &Path) -> StorageResult<Option<RosterSnapshot>> {
    match fs::read(path) {
        Ok(bytes) => RosterSnapshot::from_json_bytes(&bytes).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Io(e)),
    }
}

fn write_snapshot(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn load(&self) -> StorageResult<Option<RosterSnapshot>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&path)).await?
    }

    async fn save(&self, snapshot: &RosterSnapshot) -> StorageResult<ContentDigest> {
        let bytes = snapshot.to_json_bytes()?;
        let digest = ContentDigest::from_bytes(&bytes);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_snapshot(&path, &bytes)).await??;
        debug!(path = %self.path.display(), digest = %digest.short(), "snapshot saved");
        Ok(digest)
    }
}
