//! Integrity violations and their fixed point penalties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Result, SeatwiseError};
use super::ids::StudentId;

/// Kind of integrity violation.
///
/// The penalties are an external contract shared with the browser client
/// and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    Peeking,
    Communication,
    Copying,
    #[serde(rename = "Unauthorized Material")]
    UnauthorizedMaterial,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 4] = [
        ViolationKind::Peeking,
        ViolationKind::Communication,
        ViolationKind::Copying,
        ViolationKind::UnauthorizedMaterial,
    ];

    /// Signed credibility adjustment for this kind.
    pub fn penalty(self) -> i32 {
        match self {
            Self::Peeking => -5,
            Self::Communication => -10,
            Self::Copying => -15,
            Self::UnauthorizedMaterial => -20,
        }
    }

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Peeking => "Peeking",
            Self::Communication => "Communication",
            Self::Copying => "Copying",
            Self::UnauthorizedMaterial => "Unauthorized Material",
        }
    }

    /// Map a point value posted by the client back to its kind.
    pub fn from_points(points: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.penalty() == points)
            .ok_or(SeatwiseError::UnmappedPenalty(points))
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ViolationKind {
    type Err = SeatwiseError;

    /// Accepts the label in any case, with spaces, `-` or `_` between words.
    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "peeking" => Ok(Self::Peeking),
            "communication" => Ok(Self::Communication),
            "copying" => Ok(Self::Copying),
            "unauthorizedmaterial" => Ok(Self::UnauthorizedMaterial),
            _ => Err(SeatwiseError::UnknownViolationKind(s.to_string())),
        }
    }
}

/// An immutable entry in the integrity audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub violation_id: Uuid,
    pub student_id: StudentId,
    pub kind: ViolationKind,
    pub penalty: i32,
    pub recorded_at: DateTime<Utc>,
}

impl Violation {
    /// Create a violation stamped with the current time.
    pub fn new(student_id: StudentId, kind: ViolationKind) -> Self {
        Self::at(student_id, kind, Utc::now())
    }

    pub fn at(student_id: StudentId, kind: ViolationKind, recorded_at: DateTime<Utc>) -> Self {
        Self {
            violation_id: Uuid::new_v4(),
            student_id,
            kind,
            penalty: kind.penalty(),
            recorded_at,
        }
    }
}

/// Violation intake request (`POST /violations`).
///
/// The browser client posts `{ studentId, points }`; other callers may send
/// `kind` instead. When both are present they must agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRequest {
    pub student_id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ViolationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
}

impl ViolationRequest {
    pub fn with_kind(student_id: StudentId, kind: ViolationKind) -> Self {
        Self {
            student_id,
            kind: Some(kind),
            points: None,
        }
    }

    pub fn with_points(student_id: StudentId, points: i32) -> Self {
        Self {
            student_id,
            kind: None,
            points: Some(points),
        }
    }

    /// Resolve the violation kind this request refers to.
    pub fn resolve_kind(&self) -> Result<ViolationKind> {
        match (self.kind, self.points) {
            (Some(kind), None) => Ok(kind),
            (None, Some(points)) => ViolationKind::from_points(points),
            (Some(kind), Some(points)) if kind.penalty() == points => Ok(kind),
            (Some(kind), Some(points)) => Err(SeatwiseError::ConflictingViolation {
                kind: kind.label().to_string(),
                points,
            }),
            (None, None) => Err(SeatwiseError::MissingField("kind")),
        }
    }
}
