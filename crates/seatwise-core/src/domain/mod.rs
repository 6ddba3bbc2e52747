//! Domain models for Seatwise.
//!
//! Canonical definitions for the core entities:
//! - `StudentId` / `HallId`: stable numeric identifiers
//! - `Student`: a registered candidate and its current credibility
//! - `Violation`: an immutable integrity event
//! - `SeatwiseError`: the error taxonomy shared by every module

pub mod error;
pub mod ids;
pub mod student;
pub mod violation;

// Re-export main types and errors
pub use error::{Result, SeatwiseError};
pub use ids::{HallId, StudentId};
pub use student::{Credibility, NewStudent, Student, StudentView};
pub use violation::{Violation, ViolationKind, ViolationRequest};
