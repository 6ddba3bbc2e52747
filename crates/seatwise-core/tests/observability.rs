//! Structured tracing events and counters emitted by a session.

use seatwise_core::metrics::METRICS;
use seatwise_core::obs::{
    emit_budget_exhausted, emit_generation_failed, emit_generation_started, GenerationSpan,
};
use seatwise_core::{EngineConfig, ExamService, NewHall, NewStudent, StudentId, ViolationKind};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn roster_changes_are_logged() {
    let service = ExamService::default();
    service
        .add_student(NewStudent::new("Asha", "R01", "Math"))
        .unwrap();
    service.add_hall(NewHall::new("Main", 3, 3)).unwrap();

    assert!(logs_contain("student.added"));
    assert!(logs_contain("hall.added"));
}

#[traced_test]
#[test]
fn violation_event_carries_new_standing() {
    let service = ExamService::default();
    service
        .add_student(NewStudent::new("Asha", "R01", "Math"))
        .unwrap();
    let before = METRICS.violations_recorded();
    service
        .record_violation(StudentId(1), ViolationKind::Copying)
        .unwrap();

    assert!(logs_contain("violation.recorded"));
    assert!(logs_contain("credibility=85"));
    assert!(METRICS.violations_recorded() > before);
}

#[traced_test]
#[test]
fn generation_lifecycle_is_logged() {
    let service = ExamService::default();
    service
        .add_student(NewStudent::new("Asha", "R01", "Math"))
        .unwrap();
    service.add_hall(NewHall::new("Main", 3, 3)).unwrap();
    let before = METRICS.arrangements_generated();
    service.generate().unwrap();

    assert!(logs_contain("generation.started"));
    assert!(logs_contain("generation.finished"));
    assert!(logs_contain("seatwise.generate"));
    assert!(METRICS.arrangements_generated() > before);
}

#[traced_test]
#[test]
fn failed_generation_is_a_warning() {
    let service = ExamService::default();
    service
        .add_student(NewStudent::new("Asha", "R01", "Math"))
        .unwrap();
    let before = METRICS.generation_failures();
    assert!(service.generate().is_err());

    assert!(logs_contain("generation.failed"));
    assert!(logs_contain("no_halls_provided"));
    assert!(METRICS.generation_failures() > before);
}

#[traced_test]
#[test]
fn budget_exhaustion_is_reported() {
    let service = ExamService::new(EngineConfig::default().with_max_moves(1));
    for (i, subject) in ["A", "A", "A", "B", "B", "B", "C", "C", "C"].iter().enumerate() {
        service
            .add_student(NewStudent::new(format!("S{i}"), format!("R{i}"), *subject))
            .unwrap();
    }
    service.add_hall(NewHall::new("Main", 3, 3)).unwrap();
    let result = service.generate().unwrap();

    assert!(result.summary().budget_exhausted);
    assert!(logs_contain("generation.budget_exhausted"));
}

#[traced_test]
#[test]
fn emitters_run_standalone() {
    let _span = GenerationSpan::enter(7);
    emit_generation_started(0, 0, 0);
    emit_generation_failed("insufficient_capacity", &"10 students, 9 seats");
    emit_budget_exhausted(42);
    assert!(logs_contain("moves_evaluated=42"));
}
