//! Seatwise Core Library
//!
//! Credibility tracking for exam candidates and conflict-aware seating.
//!
//! - [`ledger`]: append-only violation ledger and credibility accounts
//! - [`risk`]: risk tier classification
//! - [`hall`]: validated hall geometry
//! - [`seating`]: the seating engine and its result type
//! - [`service`]: one exam session tying the pieces together

pub mod domain;
pub mod hall;
pub mod ledger;
pub mod metrics;
pub mod obs;
pub mod response;
pub mod risk;
pub mod seating;
pub mod service;
pub mod telemetry;

pub use domain::{
    Credibility, HallId, NewStudent, Result, SeatwiseError, Student, StudentId, StudentView,
    Violation, ViolationKind, ViolationRequest,
};
pub use hall::{
    HallModel, HallView, NewHall, SeatCoordinates, MAX_HALL_DIMENSION, MIN_HALL_DIMENSION,
};
pub use ledger::ViolationLedger;
pub use response::{
    ArrangementPayload, Envelope, HallPayload, HallsPayload, HistoryPayload, StudentPayload,
    StudentsPayload,
};
pub use risk::{classify, RiskTier, LOW_RISK_MIN_CREDIBILITY, MEDIUM_RISK_MIN_CREDIBILITY};
pub use seating::{
    ArrangementEntry, ArrangementResult, ArrangementSummary, CostWeights, EngineConfig,
    GenerationWarning, HallOrder, SeatingCandidate, SeatingEngine, SeatingError, SeatingResult,
    MAX_TOTAL_SEATS,
};
pub use service::{Dashboard, ExamService, ViolationOutcome};

pub use seatwise_state::{FsSnapshotStore, RosterSnapshot, SnapshotStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
