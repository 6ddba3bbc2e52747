//! Students and their credibility score.

use serde::{Deserialize, Serialize};

use super::error::{Result, SeatwiseError};
use super::ids::StudentId;
use crate::risk::{classify, RiskTier};

/// Accumulated trust of a student, always within `0..=100`.
///
/// Construction clamps, so an out-of-range value can never be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Credibility(u8);

impl Credibility {
    /// Full trust; every student starts here.
    pub const MAX: Credibility = Credibility(100);
    /// Exhausted trust.
    pub const MIN: Credibility = Credibility(0);

    /// Build a credibility score, clamping into `0..=100`.
    pub fn new(value: i32) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Apply a signed point adjustment, clamping the result.
    pub fn apply(self, points: i32) -> Self {
        Self::new(i32::from(self.0) + points)
    }

    pub fn is_exhausted(self) -> bool {
        self.0 == 0
    }

    /// Risk tier derived from this score.
    pub fn risk(self) -> RiskTier {
        classify(self)
    }
}

impl Default for Credibility {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<i32> for Credibility {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<Credibility> for i32 {
    fn from(c: Credibility) -> Self {
        i32::from(c.0)
    }
}

impl std::fmt::Display for Credibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// Registration request for a student (`POST /students`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    pub subject: String,
}

impl NewStudent {
    pub fn new(
        name: impl Into<String>,
        roll_no: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            roll_no: roll_no.into(),
            subject: subject.into(),
        }
    }

    /// Trim every field and reject blanks.
    pub fn normalized(&self) -> Result<NewStudent> {
        let name = self.name.trim();
        let roll_no = self.roll_no.trim();
        let subject = self.subject.trim();
        if name.is_empty() {
            return Err(SeatwiseError::MissingField("name"));
        }
        if roll_no.is_empty() {
            return Err(SeatwiseError::MissingField("rollNo"));
        }
        if subject.is_empty() {
            return Err(SeatwiseError::MissingField("subject"));
        }
        Ok(NewStudent::new(name, roll_no, subject))
    }
}

/// A registered student together with the current credibility score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub subject: String,
    pub credibility: Credibility,
}

impl Student {
    /// Risk tier, recomputed from credibility on every call.
    pub fn risk(&self) -> RiskTier {
        self.credibility.risk()
    }

    /// Read projection handed to callers (`GET /students`).
    pub fn view(&self) -> StudentView {
        StudentView {
            id: self.id,
            name: self.name.clone(),
            roll_no: self.roll_no.clone(),
            subject: self.subject.clone(),
            credibility: self.credibility,
            risk: self.risk(),
        }
    }
}

/// Serialisable snapshot of a student including the derived risk tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub subject: String,
    pub credibility: Credibility,
    pub risk: RiskTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credibility_clamps_both_ends() {
        assert_eq!(Credibility::new(150), Credibility::MAX);
        assert_eq!(Credibility::new(-40), Credibility::MIN);
        assert_eq!(Credibility::MAX.apply(-15).value(), 85);
        assert_eq!(Credibility::new(3).apply(-20), Credibility::MIN);
    }

    #[test]
    fn test_credibility_deserialize_clamps() {
        let c: Credibility = serde_json::from_str("250").unwrap();
        assert_eq!(c, Credibility::MAX);
        assert_eq!(serde_json::to_string(&Credibility::new(55)).unwrap(), "55");
    }

    #[test]
    fn test_new_student_rejects_blank_fields() {
        let err = NewStudent::new("  ", "R1", "Math").normalized().unwrap_err();
        assert!(matches!(err, SeatwiseError::MissingField("name")));

        let err = NewStudent::new("Ana", "", "Math").normalized().unwrap_err();
        assert!(matches!(err, SeatwiseError::MissingField("rollNo")));

        let err = NewStudent::new("Ana", "R1", "\t").normalized().unwrap_err();
        assert!(matches!(err, SeatwiseError::MissingField("subject")));
    }

    #[test]
    fn test_new_student_trims() {
        let s = NewStudent::new(" Ana ", " R1", "Math ").normalized().unwrap();
        assert_eq!(s, NewStudent::new("Ana", "R1", "Math"));
    }

    #[test]
    fn test_view_matches_client_shape() {
        let student = Student {
            id: StudentId(4),
            name: "Ana".into(),
            roll_no: "R-4".into(),
            subject: "Math".into(),
            credibility: Credibility::new(35),
        };
        let json = serde_json::to_value(student.view()).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["rollNo"], "R-4");
        assert_eq!(json["credibility"], 35);
        assert_eq!(json["risk"], "high");
    }
}
