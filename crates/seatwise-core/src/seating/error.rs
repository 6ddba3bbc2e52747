//! Error and warning types for seating generation.

use serde::{Deserialize, Serialize};

use crate::domain::ids::StudentId;

/// Fatal generation failures. No arrangement is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatingError {
    #[error("insufficient capacity: {required} students but only {available} seats")]
    InsufficientCapacity { required: usize, available: usize },

    #[error("no halls provided")]
    NoHallsProvided,

    #[error("student {0} appears more than once in the roster")]
    DuplicateCandidate(StudentId),

    #[error("halls hold {seats} seats in total, more than the limit of {limit}")]
    TooManySeats { seats: usize, limit: usize },
}

impl SeatingError {
    /// Stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientCapacity { .. } => "insufficient_capacity",
            Self::NoHallsProvided => "no_halls_provided",
            Self::DuplicateCandidate(_) => "duplicate_candidate",
            Self::TooManySeats { .. } => "too_many_seats",
        }
    }
}

/// Non-fatal conditions attached to a successful arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// The roster was empty; the arrangement has no entries.
    EmptyRoster,
    /// The search budget ran out; the best arrangement found is returned.
    ConstraintBudgetExhausted { moves_evaluated: u64 },
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoster => write!(f, "roster is empty; nothing to seat"),
            Self::ConstraintBudgetExhausted { moves_evaluated } => write!(
                f,
                "search budget exhausted after {moves_evaluated} moves; returning best arrangement found"
            ),
        }
    }
}

/// Result type for seating operations.
pub type SeatingResult<T> = std::result::Result<T, SeatingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_capacity_message() {
        let err = SeatingError::InsufficientCapacity {
            required: 12,
            available: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("9"));
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let w = GenerationWarning::ConstraintBudgetExhausted {
            moves_evaluated: 10,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "constraint_budget_exhausted");
        assert_eq!(json["moves_evaluated"], 10);
    }
}
