//! Uniform `{ success, error?, ... }` response envelope.
//!
//! Every service operation can be projected into this shape, which is what
//! the browser client expects from each endpoint: a `success` flag, an
//! `error` message on failure, and the payload fields flattened alongside.

use serde::Serialize;

use crate::domain::error::{Result, SeatwiseError};
use crate::domain::student::StudentView;
use crate::domain::violation::Violation;
use crate::hall::HallView;
use crate::seating::ArrangementResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            code: None,
            warnings: Vec::new(),
            payload: Some(payload),
        }
    }

    pub fn failure(error: &SeatwiseError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            code: Some(error.code()),
            warnings: Vec::new(),
            payload: None,
        }
    }

    pub fn with_warnings<I, W>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: ToString,
    {
        self.warnings.extend(warnings.into_iter().map(|w| w.to_string()));
        self
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(e) => Self::failure(&e),
        }
    }
}

impl Envelope<ArrangementPayload> {
    /// Envelope for `generate`, lifting generation warnings to the top level.
    pub fn arrangement(result: Result<ArrangementResult>) -> Self {
        match result {
            Ok(arrangement) => {
                let warnings: Vec<String> =
                    arrangement.warnings().iter().map(|w| w.to_string()).collect();
                Self::ok(ArrangementPayload { arrangement }).with_warnings(warnings)
            }
            Err(e) => Self::failure(&e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentPayload {
    pub student: StudentView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentsPayload {
    pub students: Vec<StudentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HallPayload {
    pub hall: HallView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HallsPayload {
    pub halls: Vec<HallView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPayload {
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangementPayload {
    pub arrangement: ArrangementResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::StudentId;
    use crate::seating::SeatingError;
    use crate::service::ViolationOutcome;

    #[test]
    fn test_failure_shape() {
        let env: Envelope<StudentsPayload> =
            Envelope::failure(&SeatwiseError::UnknownStudent(StudentId(4)));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "unknown student: 4");
        assert_eq!(json["code"], "unknown_student");
        assert!(json.get("students").is_none());
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_payload_is_flattened() {
        let env = Envelope::ok(HallsPayload { halls: Vec::new() });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["halls"].as_array().unwrap().is_empty());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_violation_outcome_fields() {
        let outcome = ViolationOutcome {
            student_id: StudentId(2),
            kind: crate::domain::violation::ViolationKind::UnauthorizedMaterial,
            credibility: crate::domain::student::Credibility::new(35),
            risk: crate::risk::RiskTier::High,
        };
        let json = serde_json::to_value(Envelope::ok(outcome)).unwrap();
        assert_eq!(json["studentId"], 2);
        assert_eq!(json["kind"], "Unauthorized Material");
        assert_eq!(json["credibility"], 35);
        assert_eq!(json["risk"], "high");
    }

    #[test]
    fn test_generation_error_is_a_value() {
        let err: SeatwiseError = SeatingError::InsufficientCapacity {
            required: 10,
            available: 9,
        }
        .into();
        let env = Envelope::arrangement(Err(err));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "insufficient_capacity");
        assert!(json.get("arrangement").is_none());
    }
}
