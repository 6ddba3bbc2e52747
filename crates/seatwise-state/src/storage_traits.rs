//! Storage trait definitions for Seatwise
//!
//! `SnapshotStore` is the only persistence seam the core needs: a whole
//! session is loaded at start and saved after every mutating operation.
//! The trait is async and backend-agnostic. An in-memory fake is provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;
use crate::schema::RosterSnapshot;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Content digest (SHA-256 hex string).
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `from_bytes` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whole-session snapshot persistence.
///
/// Guarantees:
/// - `load()` returns `None` until the first successful `save()`.
/// - `save(s)` replaces the previous snapshot atomically; a reader never
///   observes a partially written snapshot.
/// - `save(s)` returns the digest of the bytes that were written.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the most recently saved snapshot, if any.
    async fn load(&self) -> StorageResult<Option<RosterSnapshot>>;

    /// Replace the stored snapshot and return the digest of its encoding.
    async fn save(&self, snapshot: &RosterSnapshot) -> StorageResult<ContentDigest>;
}
