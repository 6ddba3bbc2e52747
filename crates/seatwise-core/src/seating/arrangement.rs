//! The read-only output of a seating run.

use serde::{Deserialize, Serialize};

use super::error::GenerationWarning;
use crate::domain::ids::{HallId, StudentId};
use crate::hall::HallModel;

/// One assigned seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementEntry {
    pub student_id: StudentId,
    pub hall_id: HallId,
    pub row: u32,
    pub col: u32,
}

/// Quality figures of an arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementSummary {
    pub students_placed: usize,
    pub halls_used: usize,
    /// Adjacent seat pairs whose occupants share a subject.
    pub same_subject_adjacencies: usize,
    /// Adjacent seat pairs whose occupants are both High risk.
    pub high_risk_adjacencies: usize,
    /// Weighted cost under the weights the arrangement was generated with.
    pub total_cost: u64,
    pub moves_evaluated: u64,
    pub improvements: u64,
    pub budget_exhausted: bool,
}

/// A complete arrangement: one entry per student, ordered by hall filling
/// order, then row, then column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementResult {
    entries: Vec<ArrangementEntry>,
    summary: ArrangementSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<GenerationWarning>,
    input_digest: String,
}

impl ArrangementResult {
    pub(crate) fn new(
        entries: Vec<ArrangementEntry>,
        summary: ArrangementSummary,
        warnings: Vec<GenerationWarning>,
        input_digest: String,
    ) -> Self {
        Self {
            entries,
            summary,
            warnings,
            input_digest,
        }
    }

    /// Arrangement of an empty roster.
    pub(crate) fn empty(input_digest: String) -> Self {
        Self::new(
            Vec::new(),
            ArrangementSummary::default(),
            vec![GenerationWarning::EmptyRoster],
            input_digest,
        )
    }

    pub fn entries(&self) -> &[ArrangementEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &ArrangementSummary {
        &self.summary
    }

    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    /// Hex SHA-256 of the roster, halls and weights this was generated from.
    pub fn input_digest(&self) -> &str {
        &self.input_digest
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Seat assigned to a student, if the student was in the roster.
    pub fn seat_of(&self, student_id: StudentId) -> Option<&ArrangementEntry> {
        self.entries.iter().find(|e| e.student_id == student_id)
    }

    /// Entries placed in one hall, in row-major order.
    pub fn entries_for_hall(&self, hall_id: HallId) -> impl Iterator<Item = &ArrangementEntry> {
        self.entries.iter().filter(move |e| e.hall_id == hall_id)
    }

    /// `rows x cols` grid of a hall with the seated student ids.
    ///
    /// Entries outside the hall's geometry are ignored, so a grid can be
    /// drawn even for a hall that changed since generation.
    pub fn hall_grid(&self, hall: &HallModel) -> Vec<Vec<Option<StudentId>>> {
        let mut grid = vec![vec![None; hall.cols() as usize]; hall.rows() as usize];
        for entry in self.entries_for_hall(hall.id()) {
            if hall.contains(entry.row, entry.col) {
                grid[entry.row as usize][entry.col as usize] = Some(entry.student_id);
            }
        }
        grid
    }
}
