//! Structured observability hooks for roster and seating events.
//!
//! This module provides:
//! - a generation-scoped tracing span via the `GenerationSpan` RAII guard
//! - emission functions for roster changes, violations and generation runs
//!
//! Events are emitted at `info!` (failures at `warn!`) with an `event`
//! field naming them, e.g. `event=generation.finished`.

use tracing::{info, warn};

use crate::domain::ids::{HallId, StudentId};
use crate::risk::RiskTier;
use crate::seating::ArrangementSummary;

/// RAII guard that enters a generation-scoped span for the duration of one
/// `generate` call.
///
/// ```ignore
/// let _span = GenerationSpan::enter(3);
/// // every event below carries generation = 3
/// ```
pub struct GenerationSpan {
    _span: tracing::span::EnteredSpan,
}

impl GenerationSpan {
    pub fn enter(generation: u64) -> Self {
        let span = tracing::info_span!("seatwise.generate", generation = generation);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_student_added(student_id: StudentId, roll_no: &str, subject: &str) {
    info!(
        event = "student.added",
        student_id = %student_id,
        roll_no = %roll_no,
        subject = %subject,
    );
}

pub fn emit_hall_added(hall_id: HallId, rows: u32, cols: u32) {
    info!(
        event = "hall.added",
        hall_id = %hall_id,
        rows = rows,
        cols = cols,
        capacity = rows as u64 * cols as u64,
    );
}

/// Emit event: a violation changed a student's credibility.
pub fn emit_violation_recorded(
    student_id: StudentId,
    kind: &str,
    credibility: u8,
    risk: RiskTier,
) {
    info!(
        event = "violation.recorded",
        student_id = %student_id,
        kind = %kind,
        credibility = credibility,
        risk = %risk,
    );
}

pub fn emit_generation_started(students: usize, halls: usize, seats: usize) {
    info!(
        event = "generation.started",
        students = students,
        halls = halls,
        seats = seats,
    );
}

/// Emit event: generation produced an arrangement.
pub fn emit_generation_finished(
    summary: &ArrangementSummary,
    input_digest: &str,
    duration_ms: u64,
) {
    let input = &input_digest[..12.min(input_digest.len())];
    info!(
        event = "generation.finished",
        input = %input,
        students_placed = summary.students_placed,
        halls_used = summary.halls_used,
        same_subject_adjacencies = summary.same_subject_adjacencies,
        high_risk_adjacencies = summary.high_risk_adjacencies,
        moves_evaluated = summary.moves_evaluated,
        duration_ms = duration_ms,
    );
}

/// Emit event: generation returned an error (warning level).
pub fn emit_generation_failed(code: &str, error: &dyn std::fmt::Display) {
    warn!(event = "generation.failed", code = %code, error = %error);
}

/// Emit event: the search budget ran out before the search converged.
pub fn emit_budget_exhausted(moves_evaluated: u64) {
    warn!(
        event = "generation.budget_exhausted",
        moves_evaluated = moves_evaluated,
    );
}
