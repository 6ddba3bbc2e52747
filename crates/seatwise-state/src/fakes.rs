//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemorySnapshotStore`, which satisfies the `SnapshotStore`
//! contract without touching the filesystem.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::schema::RosterSnapshot;
use crate::storage_traits::*;

/// In-memory snapshot store holding the last saved snapshot.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<RosterSnapshot>>,
    saves: Mutex<u64>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: RosterSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> u64 {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> StorageResult<Option<RosterSnapshot>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &RosterSnapshot) -> StorageResult<ContentDigest> {
        let bytes = snapshot.to_json_bytes()?;
        let digest = ContentDigest::from_bytes(&bytes);
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(digest)
    }
}
