//! Seating arrangement generation entry point.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::arrangement::{ArrangementEntry, ArrangementResult, ArrangementSummary};
use super::config::EngineConfig;
use super::conflict::{ConflictGraph, SeatingCandidate};
use super::error::{GenerationWarning, SeatingError, SeatingResult};
use super::layout::SeatLayout;
use super::search::{Evaluator, Placement, SearchBudget};
use super::seed::InputDigest;
use crate::hall::HallModel;

/// Largest number of seats, summed over every hall, a single run will lay
/// out.
pub const MAX_TOTAL_SEATS: usize = 20_000;

/// Places a roster into halls, keeping conflicting students apart.
///
/// The engine is stateless between calls: equal inputs and configuration
/// always yield equal arrangements.
#[derive(Debug, Clone, Default)]
pub struct SeatingEngine {
    config: EngineConfig,
}

impl SeatingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate an arrangement for `candidates` across `halls`.
    ///
    /// An empty roster is not an error: the result is empty and carries a
    /// [`GenerationWarning::EmptyRoster`]. When the move or time budget runs
    /// out, the best arrangement found so far is returned with a
    /// [`GenerationWarning::ConstraintBudgetExhausted`].
    ///
    /// # Errors
    ///
    /// - `NoHallsProvided` when `halls` is empty and there is someone to seat
    /// - `DuplicateCandidate` when a student id appears twice
    /// - `InsufficientCapacity` when the halls hold fewer seats than students
    /// - `TooManySeats` when the halls hold more than [`MAX_TOTAL_SEATS`]
    pub fn generate(
        &self,
        candidates: &[SeatingCandidate],
        halls: &[HallModel],
    ) -> SeatingResult<ArrangementResult> {
        let ordered = self.config.hall_order.arrange(halls);
        let digest = InputDigest::compute(candidates, &ordered, self.config.weights);

        if candidates.is_empty() {
            return Ok(ArrangementResult::empty(digest.to_hex()));
        }
        if ordered.is_empty() {
            return Err(SeatingError::NoHallsProvided);
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        for c in candidates {
            if !seen.insert(c.student_id) {
                return Err(SeatingError::DuplicateCandidate(c.student_id));
            }
        }

        let available: usize = ordered.iter().map(|h| h.capacity()).sum();
        let insufficient = SeatingError::InsufficientCapacity {
            required: candidates.len(),
            available,
        };
        if available < candidates.len() {
            return Err(insufficient);
        }
        if available > MAX_TOTAL_SEATS {
            return Err(SeatingError::TooManySeats {
                seats: available,
                limit: MAX_TOTAL_SEATS,
            });
        }

        let layout = SeatLayout::build(&ordered);
        let graph = ConflictGraph::build(candidates, self.config.weights);
        let eval = Evaluator::new(&layout, &graph);

        let start = eval
            .construct(&graph.placement_order())
            .ok_or(insufficient)?;
        let initial = eval.cost(&start);

        let mut budget = SearchBudget::new(self.config.max_moves, self.config.time_budget);
        let mut rng = StdRng::seed_from_u64(digest.seed());
        let (placement, stats) = eval.improve(start, &mut budget, &mut rng, self.config.restarts);
        let cost = eval.cost(&placement);

        debug!(
            students = candidates.len(),
            seats = layout.len(),
            initial_conflict = initial.conflict,
            final_conflict = cost.conflict,
            moves = budget.moves(),
            restarts = stats.restarts_run,
            "seating search finished"
        );

        let (entries, mut summary) = project(&layout, &graph, candidates, &placement);
        summary.total_cost = cost.conflict;
        summary.moves_evaluated = budget.moves();
        summary.improvements = stats.improvements;
        summary.budget_exhausted = budget.is_exhausted();

        let mut warnings = Vec::new();
        if budget.is_exhausted() {
            warnings.push(GenerationWarning::ConstraintBudgetExhausted {
                moves_evaluated: budget.moves(),
            });
        }

        Ok(ArrangementResult::new(
            entries,
            summary,
            warnings,
            digest.to_hex(),
        ))
    }
}

/// Read the placement out seat by seat, which yields entries in hall
/// filling order, then row, then column.
fn project(
    layout: &SeatLayout,
    graph: &ConflictGraph,
    candidates: &[SeatingCandidate],
    placement: &Placement,
) -> (Vec<ArrangementEntry>, ArrangementSummary) {
    let mut entries = Vec::with_capacity(candidates.len());
    let mut halls_used = HashSet::new();
    for seat in 0..layout.len() {
        if let Some(student) = placement.occupant(seat) {
            let slot = layout.slot(seat);
            halls_used.insert(slot.hall_id);
            entries.push(ArrangementEntry {
                student_id: candidates[student].student_id,
                hall_id: slot.hall_id,
                row: slot.row,
                col: slot.col,
            });
        }
    }

    let mut summary = ArrangementSummary {
        students_placed: entries.len(),
        halls_used: halls_used.len(),
        ..Default::default()
    };
    for (p, q) in layout.edges() {
        if let (Some(a), Some(b)) = (placement.occupant(p), placement.occupant(q)) {
            if graph.same_subject(a, b) {
                summary.same_subject_adjacencies += 1;
            }
            if graph.both_high(a, b) {
                summary.high_risk_adjacencies += 1;
            }
        }
    }
    (entries, summary)
}
