//! Persistence schema for a roster snapshot.
//!
//! Records are plain data. Credibility is deliberately absent: it is a
//! function of the violation log and is recomputed whenever a snapshot is
//! loaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// Highest snapshot schema version this crate can read.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// A registered exam candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: u64,
    pub name: String,
    pub roll_no: String,
    pub subject: String,
}

/// A registered exam hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallRecord {
    pub id: u64,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

/// One entry of the integrity audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    pub violation_id: Uuid,
    pub student_id: u64,
    /// Display name of the violation kind, e.g. `"Unauthorized Material"`.
    pub kind: String,
    pub points: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Everything required to rebuild an exam session.
///
/// `violations` is kept in recording order; replaying it front to back
/// reproduces every student's credibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub version: u32,
    pub students: Vec<StudentRecord>,
    pub halls: Vec<HallRecord>,
    pub violations: Vec<ViolationRecord>,
    pub saved_at: DateTime<Utc>,
}

impl RosterSnapshot {
    /// Create a snapshot stamped with the current schema version and time.
    pub fn new(
        students: Vec<StudentRecord>,
        halls: Vec<HallRecord>,
        violations: Vec<ViolationRecord>,
    ) -> Self {
        Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            students,
            halls,
            violations,
            saved_at: Utc::now(),
        }
    }

    /// An empty snapshot for a fresh session.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    /// Serialize to pretty JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Parse JSON bytes, rejecting snapshots from a newer schema.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let snapshot: RosterSnapshot = serde_json::from_slice(bytes)
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;
        if snapshot.version > SNAPSHOT_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_record_uses_glue_field_names() {
        let record = StudentRecord {
            id: 7,
            name: "Asha".to_string(),
            roll_no: "R-07".to_string(),
            subject: "Physics".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rollNo"], "R-07");
        assert!(json.get("roll_no").is_none());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut snapshot = RosterSnapshot::empty();
        snapshot.version = SNAPSHOT_SCHEMA_VERSION + 1;
        let bytes = serde_json::to_vec(&snapshot).unwrap();

        let err = RosterSnapshot::from_json_bytes(&bytes).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_garbage_bytes_fail_deserialization() {
        let err = RosterSnapshot::from_json_bytes(b"not json").unwrap_err();
        assert!(matches!(err, StorageError::Deserialization(_)));
    }
}
