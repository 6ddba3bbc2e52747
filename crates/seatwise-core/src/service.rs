//! The exam session: roster, halls, violation ledger and seating.
//!
//! `ExamService` owns all mutable state of one session. It is created at
//! start (empty or from a stored snapshot) and dropped at shutdown; there
//! is no global state.
//!
//! Lock order is roster, then halls, then the ledger. `generate` holds a
//! session-wide generation lock for the whole call, so two generations
//! never run concurrently against the same session.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use seatwise_state::{
    ContentDigest, HallRecord, RosterSnapshot, SnapshotStore, StudentRecord, ViolationRecord,
};

use crate::domain::error::{Result, SeatwiseError};
use crate::domain::ids::{HallId, StudentId};
use crate::domain::student::{Credibility, NewStudent, Student, StudentView};
use crate::domain::violation::{Violation, ViolationKind, ViolationRequest};
use crate::hall::{HallModel, HallView, NewHall};
use crate::ledger::ViolationLedger;
use crate::metrics::METRICS;
use crate::obs;
use crate::risk::RiskTier;
use crate::seating::{ArrangementResult, EngineConfig, SeatingCandidate, SeatingEngine};

#[derive(Debug)]
struct Roster {
    entries: Vec<(StudentId, NewStudent)>,
    next_id: u64,
}

#[derive(Debug)]
struct Halls {
    entries: Vec<HallModel>,
    next_id: u64,
}

/// Credibility and risk after a violation was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationOutcome {
    pub student_id: StudentId,
    pub kind: ViolationKind,
    pub credibility: Credibility,
    pub risk: RiskTier,
}

/// Headline counts for the proctor dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_students: usize,
    pub low_risk: usize,
    pub medium_risk: usize,
    /// Includes students whose credibility is exhausted.
    pub high_risk: usize,
    pub total_halls: usize,
}

/// One exam session.
#[derive(Debug)]
pub struct ExamService {
    engine: SeatingEngine,
    roster: RwLock<Roster>,
    halls: RwLock<Halls>,
    ledger: ViolationLedger,
    generation: Mutex<()>,
    generations_run: AtomicU64,
}

impl Default for ExamService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ExamService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: SeatingEngine::new(config),
            roster: RwLock::new(Roster {
                entries: Vec::new(),
                next_id: 1,
            }),
            halls: RwLock::new(Halls {
                entries: Vec::new(),
                next_id: 1,
            }),
            ledger: ViolationLedger::new(),
            generation: Mutex::new(()),
            generations_run: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Register a student at full credibility.
    ///
    /// # Errors
    ///
    /// `MissingField` for a blank field, `DuplicateRollNumber` when the roll
    /// number is taken. Nothing is registered on error.
    pub fn add_student(&self, new: NewStudent) -> Result<StudentView> {
        let new = new.normalized()?;
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        if roster.entries.iter().any(|(_, s)| s.roll_no == new.roll_no) {
            return Err(SeatwiseError::DuplicateRollNumber(new.roll_no));
        }
        let id = StudentId(roster.next_id);
        roster.next_id += 1;
        self.ledger.register(id);
        roster.entries.push((id, new.clone()));
        drop(roster);

        obs::emit_student_added(id, &new.roll_no, &new.subject);
        Ok(Student {
            id,
            name: new.name,
            roll_no: new.roll_no,
            subject: new.subject,
            credibility: Credibility::MAX,
        }
        .view())
    }

    /// Register a hall.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` when rows or cols is below 3, `MissingField` for a
    /// blank name.
    pub fn add_hall(&self, new: NewHall) -> Result<HallView> {
        let mut halls = self.halls.write().unwrap_or_else(PoisonError::into_inner);
        let hall = HallModel::new(HallId(halls.next_id), new.name, new.rows, new.cols)?;
        halls.next_id += 1;
        let view = hall.view();
        halls.entries.push(hall);
        drop(halls);

        obs::emit_hall_added(view.id, view.rows, view.cols);
        Ok(view)
    }

    /// Record a violation and return the student's new standing.
    pub fn record_violation(
        &self,
        student_id: StudentId,
        kind: ViolationKind,
    ) -> Result<ViolationOutcome> {
        let credibility = self.ledger.record(student_id, kind)?;
        let risk = credibility.risk();
        METRICS.inc_violations();
        obs::emit_violation_recorded(student_id, kind.label(), credibility.value(), risk);
        Ok(ViolationOutcome {
            student_id,
            kind,
            credibility,
            risk,
        })
    }

    /// Record a violation posted as `{ studentId, kind | points }`.
    ///
    /// The request is resolved to a kind before anything is written.
    pub fn record_violation_request(&self, request: &ViolationRequest) -> Result<ViolationOutcome> {
        let kind = request.resolve_kind()?;
        self.record_violation(request.student_id, kind)
    }

    /// Every student in registration order.
    pub fn students(&self) -> Vec<StudentView> {
        let roster = self.roster.read().unwrap_or_else(PoisonError::into_inner);
        let credibility = self.ledger.credibility_snapshot();
        roster
            .entries
            .iter()
            .map(|(id, s)| {
                Student {
                    id: *id,
                    name: s.name.clone(),
                    roll_no: s.roll_no.clone(),
                    subject: s.subject.clone(),
                    credibility: credibility.get(id).copied().unwrap_or_default(),
                }
                .view()
            })
            .collect()
    }

    pub fn student(&self, student_id: StudentId) -> Result<StudentView> {
        let roster = self.roster.read().unwrap_or_else(PoisonError::into_inner);
        let (id, s) = roster
            .entries
            .iter()
            .find(|(id, _)| *id == student_id)
            .ok_or(SeatwiseError::UnknownStudent(student_id))?;
        Ok(Student {
            id: *id,
            name: s.name.clone(),
            roll_no: s.roll_no.clone(),
            subject: s.subject.clone(),
            credibility: self.ledger.credibility_of(*id)?,
        }
        .view())
    }

    /// Every hall in registration order.
    pub fn halls(&self) -> Vec<HallView> {
        self.hall_models().iter().map(HallModel::view).collect()
    }

    pub fn hall_models(&self) -> Vec<HallModel> {
        self.halls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Violations of one student, oldest first.
    pub fn history(&self, student_id: StudentId) -> Result<Vec<Violation>> {
        self.ledger.history_for(student_id)
    }

    pub fn dashboard(&self) -> Dashboard {
        let students = self.students();
        let total_halls = self
            .halls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len();
        let mut dashboard = Dashboard {
            total_students: students.len(),
            total_halls,
            ..Default::default()
        };
        for s in &students {
            match s.risk {
                RiskTier::Low => dashboard.low_risk += 1,
                RiskTier::Medium => dashboard.medium_risk += 1,
                RiskTier::High => dashboard.high_risk += 1,
            }
        }
        dashboard
    }

    /// Seat the current roster across all halls.
    ///
    /// Roster, halls and credibility are read as one consistent snapshot;
    /// violations recorded while the engine runs affect the next call only.
    pub fn generate(&self) -> Result<ArrangementResult> {
        let _guard = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = self.generations_run.fetch_add(1, Ordering::Relaxed) + 1;
        let _span = obs::GenerationSpan::enter(generation);
        let started = Instant::now();

        let (candidates, halls) = {
            let roster = self.roster.read().unwrap_or_else(PoisonError::into_inner);
            let halls = self.halls.read().unwrap_or_else(PoisonError::into_inner);
            let credibility = self.ledger.credibility_snapshot();
            let candidates: Vec<SeatingCandidate> = roster
                .entries
                .iter()
                .map(|(id, s)| {
                    let score = credibility.get(id).copied().unwrap_or_default();
                    SeatingCandidate::new(*id, s.subject.clone(), score.risk())
                })
                .collect();
            (candidates, halls.entries.clone())
        };

        let seats: usize = halls.iter().map(HallModel::capacity).sum();
        obs::emit_generation_started(candidates.len(), halls.len(), seats);

        match self.engine.generate(&candidates, &halls) {
            Ok(result) => {
                METRICS.inc_arrangements();
                if result.summary().budget_exhausted {
                    METRICS.inc_budget_exhaustions();
                    obs::emit_budget_exhausted(result.summary().moves_evaluated);
                }
                obs::emit_generation_finished(
                    result.summary(),
                    result.input_digest(),
                    started.elapsed().as_millis() as u64,
                );
                Ok(result)
            }
            Err(e) => {
                METRICS.inc_generation_failures();
                obs::emit_generation_failed(e.code(), &e);
                Err(e.into())
            }
        }
    }

    /// Rebuild a session from a stored snapshot.
    ///
    /// Credibility is recomputed by replaying the violation log in order;
    /// nothing about a student's standing is taken from storage directly.
    ///
    /// # Errors
    ///
    /// `InvalidSnapshot` when a record fails validation or a violation
    /// refers to a student the snapshot does not contain.
    pub fn from_snapshot(snapshot: &RosterSnapshot, config: EngineConfig) -> Result<Self> {
        let service = Self::new(config);
        {
            let mut roster = service.roster.write().unwrap_or_else(PoisonError::into_inner);
            let mut roll_numbers = HashSet::new();
            for record in &snapshot.students {
                let new = NewStudent::new(&record.name, &record.roll_no, &record.subject)
                    .normalized()
                    .map_err(|e| invalid(format!("student {}: {e}", record.id)))?;
                let id = StudentId(record.id);
                if !service.ledger.register(id) {
                    return Err(invalid(format!("student id {id} appears twice")));
                }
                if !roll_numbers.insert(new.roll_no.clone()) {
                    return Err(invalid(format!("roll number {} appears twice", new.roll_no)));
                }
                let next = record
                    .id
                    .checked_add(1)
                    .ok_or_else(|| invalid(format!("student id {id} is out of range")))?;
                roster.next_id = roster.next_id.max(next);
                roster.entries.push((id, new));
            }
        }
        {
            let mut halls = service.halls.write().unwrap_or_else(PoisonError::into_inner);
            for record in &snapshot.halls {
                if halls.entries.iter().any(|h| h.id().0 == record.id) {
                    return Err(invalid(format!("hall id {} appears twice", record.id)));
                }
                let hall = HallModel::new(HallId(record.id), &record.name, record.rows, record.cols)
                    .map_err(|e| invalid(format!("hall {}: {e}", record.id)))?;
                let next = record
                    .id
                    .checked_add(1)
                    .ok_or_else(|| invalid(format!("hall id {} is out of range", record.id)))?;
                halls.next_id = halls.next_id.max(next);
                halls.entries.push(hall);
            }
        }
        for record in &snapshot.violations {
            let kind: ViolationKind = record
                .kind
                .parse()
                .map_err(|e| invalid(format!("violation {}: {e}", record.violation_id)))?;
            let violation = Violation {
                violation_id: record.violation_id,
                student_id: StudentId(record.student_id),
                kind,
                penalty: kind.penalty(),
                recorded_at: record.recorded_at,
            };
            service
                .ledger
                .append(violation)
                .map_err(|e| invalid(format!("violation {}: {e}", record.violation_id)))?;
        }
        Ok(service)
    }

    /// Export the session as a snapshot.
    pub fn snapshot(&self) -> RosterSnapshot {
        let roster = self.roster.read().unwrap_or_else(PoisonError::into_inner);
        let halls = self.halls.read().unwrap_or_else(PoisonError::into_inner);
        let students = roster
            .entries
            .iter()
            .map(|(id, s)| StudentRecord {
                id: id.0,
                name: s.name.clone(),
                roll_no: s.roll_no.clone(),
                subject: s.subject.clone(),
            })
            .collect();
        let hall_records = halls
            .entries
            .iter()
            .map(|h| HallRecord {
                id: h.id().0,
                name: h.name().to_string(),
                rows: h.rows(),
                cols: h.cols(),
            })
            .collect();
        let violations = self
            .ledger
            .audit_log()
            .into_iter()
            .map(|v| ViolationRecord {
                violation_id: v.violation_id,
                student_id: v.student_id.0,
                kind: v.kind.label().to_string(),
                points: v.penalty,
                recorded_at: v.recorded_at,
            })
            .collect();
        RosterSnapshot::new(students, hall_records, violations)
    }

    /// Load a session from `store`, or start an empty one if nothing is
    /// stored yet.
    pub async fn load(store: &dyn SnapshotStore, config: EngineConfig) -> Result<Self> {
        match store.load().await? {
            Some(snapshot) => Self::from_snapshot(&snapshot, config),
            None => Ok(Self::new(config)),
        }
    }

    /// Save the session to `store`.
    pub async fn persist(&self, store: &dyn SnapshotStore) -> Result<ContentDigest> {
        let snapshot = self.snapshot();
        Ok(store.save(&snapshot).await?)
    }
}

fn invalid(message: String) -> SeatwiseError {
    SeatwiseError::InvalidSnapshot(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_students(subjects: &[&str]) -> ExamService {
        let service = ExamService::default();
        for (i, subject) in subjects.iter().enumerate() {
            service
                .add_student(NewStudent::new(
                    format!("Student {i}"),
                    format!("R{i:03}"),
                    *subject,
                ))
                .unwrap();
        }
        service
    }

    #[test]
    fn test_new_student_starts_low_risk() {
        let service = ExamService::default();
        let view = service
            .add_student(NewStudent::new(" Asha ", "R-1", "Physics"))
            .unwrap();
        assert_eq!(view.id, StudentId(1));
        assert_eq!(view.name, "Asha");
        assert_eq!(view.credibility, Credibility::MAX);
        assert_eq!(view.risk, RiskTier::Low);
    }

    #[test]
    fn test_duplicate_roll_number_is_rejected() {
        let service = service_with_students(&["Physics"]);
        let err = service
            .add_student(NewStudent::new("Other", "R000", "Chemistry"))
            .unwrap_err();
        assert!(matches!(err, SeatwiseError::DuplicateRollNumber(_)));
        assert_eq!(service.students().len(), 1);
    }

    #[test]
    fn test_invalid_hall_allocates_no_id() {
        let service = ExamService::default();
        assert!(service.add_hall(NewHall::new("Tiny", 2, 5)).is_err());
        assert!(service.add_hall(NewHall::new("Stadium", 60_000, 60_000)).is_err());
        let hall = service.add_hall(NewHall::new("Main", 3, 3)).unwrap();
        assert_eq!(hall.id, HallId(1));
        assert_eq!(hall.capacity, 9);
    }

    #[test]
    fn test_violation_updates_risk() {
        let service = service_with_students(&["Physics"]);
        let id = StudentId(1);
        service
            .record_violation(id, ViolationKind::UnauthorizedMaterial)
            .unwrap();
        let outcome = service
            .record_violation_request(&ViolationRequest::with_points(id, -15))
            .unwrap();
        assert_eq!(outcome.credibility.value(), 65);
        assert_eq!(outcome.risk, RiskTier::Medium);
        assert_eq!(service.student(id).unwrap().risk, RiskTier::Medium);
        assert_eq!(service.history(id).unwrap().len(), 2);
    }

    #[test]
    fn test_unmapped_points_write_nothing() {
        let service = service_with_students(&["Physics"]);
        let err = service
            .record_violation_request(&ViolationRequest::with_points(StudentId(1), -7))
            .unwrap_err();
        assert!(matches!(err, SeatwiseError::UnmappedPenalty(-7)));
        assert!(service.history(StudentId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_counts() {
        let service = service_with_students(&["A", "B", "C"]);
        service.add_hall(NewHall::new("Main", 3, 3)).unwrap();
        for _ in 0..3 {
            service
                .record_violation(StudentId(2), ViolationKind::Copying)
                .unwrap();
        }
        for _ in 0..5 {
            service
                .record_violation(StudentId(3), ViolationKind::UnauthorizedMaterial)
                .unwrap();
        }
        let d = service.dashboard();
        assert_eq!(d.total_students, 3);
        assert_eq!(d.low_risk, 1);
        assert_eq!(d.medium_risk, 1);
        assert_eq!(d.high_risk, 1);
        assert_eq!(d.total_halls, 1);
    }

    #[test]
    fn test_generate_uses_current_risk() {
        let service = service_with_students(&["A", "B", "C", "D"]);
        service.add_hall(NewHall::new("Main", 3, 3)).unwrap();
        let result = service.generate().unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.summary().high_risk_adjacencies, 0);
    }

    #[test]
    fn test_snapshot_round_trip_replays_credibility() {
        let service = service_with_students(&["A", "B"]);
        service.add_hall(NewHall::new("Main", 4, 4)).unwrap();
        service
            .record_violation(StudentId(2), ViolationKind::Communication)
            .unwrap();

        let snapshot = service.snapshot();
        let restored = ExamService::from_snapshot(&snapshot, EngineConfig::default()).unwrap();
        assert_eq!(restored.students(), service.students());
        assert_eq!(restored.halls(), service.halls());
        assert_eq!(restored.history(StudentId(2)).unwrap(), service.history(StudentId(2)).unwrap());

        let next = restored
            .add_student(NewStudent::new("New", "R900", "C"))
            .unwrap();
        assert_eq!(next.id, StudentId(3));
    }

    #[test]
    fn test_snapshot_with_orphan_violation_is_rejected() {
        let mut snapshot = service_with_students(&["A"]).snapshot();
        snapshot.violations.push(ViolationRecord {
            violation_id: uuid::Uuid::new_v4(),
            student_id: 42,
            kind: "Peeking".to_string(),
            points: -5,
            recorded_at: chrono::Utc::now(),
        });
        let err = ExamService::from_snapshot(&snapshot, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, SeatwiseError::InvalidSnapshot(_)));
    }

    #[test]
    fn test_snapshot_with_maximal_id_is_rejected() {
        let service = service_with_students(&["A"]);
        service.add_hall(NewHall::new("Main", 3, 3)).unwrap();

        let mut snapshot = service.snapshot();
        snapshot.students[0].id = u64::MAX;
        let err = ExamService::from_snapshot(&snapshot, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, SeatwiseError::InvalidSnapshot(_)));

        let mut snapshot = service.snapshot();
        snapshot.halls[0].id = u64::MAX;
        let err = ExamService::from_snapshot(&snapshot, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, SeatwiseError::InvalidSnapshot(_)));
    }
}
