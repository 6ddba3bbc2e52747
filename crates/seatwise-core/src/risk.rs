//! Risk tiers derived from credibility.
//!
//! Classification is a pure function of the score. The thresholds below are
//! the only place the tier boundaries are defined.

use serde::{Deserialize, Serialize};

use crate::domain::student::Credibility;

/// Lowest credibility still classified [`RiskTier::Low`].
pub const LOW_RISK_MIN_CREDIBILITY: u8 = 70;

/// Lowest credibility still classified [`RiskTier::Medium`].
pub const MEDIUM_RISK_MIN_CREDIBILITY: u8 = 40;

/// Proctoring risk tier of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Credibility at or above [`LOW_RISK_MIN_CREDIBILITY`].
    Low,
    /// Credibility in `[MEDIUM_RISK_MIN_CREDIBILITY, LOW_RISK_MIN_CREDIBILITY)`.
    Medium,
    /// Credibility below [`MEDIUM_RISK_MIN_CREDIBILITY`], or exhausted.
    High,
}

impl RiskTier {
    /// Whether seating should keep students of this tier apart.
    pub fn needs_spacing(self) -> bool {
        matches!(self, Self::High)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Classify a credibility score into a risk tier.
///
/// A score of zero is always `High`, independent of the thresholds.
pub fn classify(credibility: Credibility) -> RiskTier {
    let value = credibility.value();
    if credibility.is_exhausted() {
        RiskTier::High
    } else if value >= LOW_RISK_MIN_CREDIBILITY {
        RiskTier::Low
    } else if value >= MEDIUM_RISK_MIN_CREDIBILITY {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}
