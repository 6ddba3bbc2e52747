//! Domain-level error taxonomy for Seatwise.

use super::ids::StudentId;
use crate::seating::error::SeatingError;

/// Seatwise domain errors.
///
/// Every variant is a recoverable, caller-facing condition. Validation
/// variants are raised before any state is touched.
#[derive(Debug, thiserror::Error)]
pub enum SeatwiseError {
    #[error("unknown student: {0}")]
    UnknownStudent(StudentId),

    #[error("invalid hall geometry: {rows}x{cols} (rows and cols must both be between 3 and 100)")]
    InvalidGeometry { rows: u32, cols: u32 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("roll number already registered: {0}")]
    DuplicateRollNumber(String),

    #[error("unknown violation kind: {0}")]
    UnknownViolationKind(String),

    #[error("no violation kind carries a penalty of {0} points")]
    UnmappedPenalty(i32),

    #[error("violation kind {kind} does not match {points} points")]
    ConflictingViolation { kind: String, points: i32 },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("seating error: {0}")]
    Seating(#[from] SeatingError),

    #[error("storage error: {0}")]
    Storage(#[from] seatwise_state::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SeatwiseError {
    /// Stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownStudent(_) => "unknown_student",
            Self::InvalidGeometry { .. } => "invalid_geometry",
            Self::MissingField(_) => "missing_field",
            Self::DuplicateRollNumber(_) => "duplicate_roll_number",
            Self::UnknownViolationKind(_) => "unknown_violation_kind",
            Self::UnmappedPenalty(_) => "unmapped_penalty",
            Self::ConflictingViolation { .. } => "conflicting_violation",
            Self::InvalidSnapshot(_) => "invalid_snapshot",
            Self::Seating(e) => e.code(),
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Result type for Seatwise domain operations.
pub type Result<T> = std::result::Result<T, SeatwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_geometry_display() {
        let err = SeatwiseError::InvalidGeometry { rows: 2, cols: 5 };
        let msg = err.to_string();
        assert!(msg.contains("2x5"));
        assert_eq!(err.code(), "invalid_geometry");
    }

    #[test]
    fn test_seating_error_code_passes_through() {
        let err: SeatwiseError = SeatingError::NoHallsProvided.into();
        assert_eq!(err.code(), "no_halls_provided");
        assert!(err.to_string().contains("seating error"));
    }

    #[test]
    fn test_unknown_student_display() {
        let err = SeatwiseError::UnknownStudent(StudentId(99));
        assert_eq!(err.to_string(), "unknown student: 99");
    }
}
