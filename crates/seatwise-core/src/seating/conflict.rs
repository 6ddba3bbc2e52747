//! Seating candidates and the implicit conflict graph between them.
//!
//! Two candidates conflict when they share a subject or are both High risk.
//! The graph is never materialised as an edge list: with subjects interned
//! to integers, the weight of any pair is computed in constant time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::CostWeights;
use crate::domain::ids::StudentId;
use crate::risk::RiskTier;

/// A student as seen by the seating engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingCandidate {
    pub student_id: StudentId,
    pub subject: String,
    pub risk: RiskTier,
}

impl SeatingCandidate {
    pub fn new(student_id: StudentId, subject: impl Into<String>, risk: RiskTier) -> Self {
        Self {
            student_id,
            subject: subject.into(),
            risk,
        }
    }
}

/// Subjects compare case-insensitively and ignore surrounding whitespace.
pub(crate) fn subject_key(subject: &str) -> String {
    subject.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub(crate) struct ConflictGraph {
    subject: Vec<u32>,
    high: Vec<bool>,
    degree: Vec<u64>,
    weights: CostWeights,
}

impl ConflictGraph {
    pub(crate) fn build(candidates: &[SeatingCandidate], weights: CostWeights) -> Self {
        let mut interned: HashMap<String, u32> = HashMap::new();
        let subject: Vec<u32> = candidates
            .iter()
            .map(|c| {
                let next = interned.len() as u32;
                *interned.entry(subject_key(&c.subject)).or_insert(next)
            })
            .collect();
        let high: Vec<bool> = candidates.iter().map(|c| c.risk.needs_spacing()).collect();

        let mut subject_sizes = vec![0u64; interned.len()];
        for s in &subject {
            subject_sizes[*s as usize] += 1;
        }
        let high_count = high.iter().filter(|h| **h).count() as u64;

        let degree = (0..candidates.len())
            .map(|i| {
                let peers = subject_sizes[subject[i] as usize] - 1;
                let mut d = peers.saturating_mul(weights.subject_adjacency);
                if high[i] {
                    d = d.saturating_add(
                        (high_count - 1).saturating_mul(weights.high_risk_adjacency),
                    );
                }
                d
            })
            .collect();

        Self {
            subject,
            high,
            degree,
            weights,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subject.len()
    }

    pub(crate) fn same_subject(&self, a: usize, b: usize) -> bool {
        self.subject[a] == self.subject[b]
    }

    pub(crate) fn both_high(&self, a: usize, b: usize) -> bool {
        self.high[a] && self.high[b]
    }

    /// Cost of seating `a` and `b` next to each other.
    pub(crate) fn pair_cost(&self, a: usize, b: usize) -> u64 {
        let mut cost = 0u64;
        if self.same_subject(a, b) {
            cost = cost.saturating_add(self.weights.subject_adjacency);
        }
        if self.both_high(a, b) {
            cost = cost.saturating_add(self.weights.high_risk_adjacency);
        }
        cost
    }

    /// Total weight of every edge incident to `a`.
    pub(crate) fn degree(&self, a: usize) -> u64 {
        self.degree[a]
    }

    /// Candidates ordered for greedy placement: heaviest conflict degree
    /// first, roster order among equals.
    pub(crate) fn placement_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.degree(b).cmp(&self.degree(a)));
        order
    }
}
