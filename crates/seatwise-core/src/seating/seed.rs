//! Stable digest of a generation input.
//!
//! The digest covers the roster in order, the halls in filling order and
//! the cost weights. It names the input in logs and results, and its first
//! eight bytes seed the perturbation RNG, so equal inputs always take the
//! same search path.

use sha2::{Digest, Sha256};

use super::config::CostWeights;
use super::conflict::{subject_key, SeatingCandidate};
use crate::hall::HallModel;

/// SHA-256 of a generation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDigest {
    bytes: [u8; 32],
}

impl InputDigest {
    pub fn compute(
        candidates: &[SeatingCandidate],
        ordered_halls: &[&HallModel],
        weights: CostWeights,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"seatwise/v1\0");
        hasher.update(weights.subject_adjacency.to_be_bytes());
        hasher.update(weights.high_risk_adjacency.to_be_bytes());

        hasher.update((candidates.len() as u64).to_be_bytes());
        for c in candidates {
            hasher.update(c.student_id.0.to_be_bytes());
            let key = subject_key(&c.subject);
            hasher.update((key.len() as u64).to_be_bytes());
            hasher.update(key.as_bytes());
            hasher.update([c.risk.needs_spacing() as u8]);
        }

        hasher.update((ordered_halls.len() as u64).to_be_bytes());
        for h in ordered_halls {
            hasher.update(h.id().0.to_be_bytes());
            hasher.update(h.rows().to_be_bytes());
            hasher.update(h.cols().to_be_bytes());
        }

        Self {
            bytes: hasher.finalize().into(),
        }
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// RNG seed derived from the digest.
    pub fn seed(&self) -> u64 {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.bytes[..8]);
        u64::from_be_bytes(head)
    }
}
