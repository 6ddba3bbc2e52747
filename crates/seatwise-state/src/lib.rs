//! Seatwise-State: roster snapshot persistence for Seatwise
//!
//! This crate is the persistence collaborator of the Seatwise core. The core
//! never performs I/O itself; it exports a [`RosterSnapshot`] and hands it to
//! a [`SnapshotStore`].
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: durable, append-friendly records of students, halls and the
//! violation audit log.
//!
//! ## Key Components
//!
//! - `SnapshotStore`: async load/save contract for a roster snapshot
//! - `RosterSnapshot`: schema of everything a session needs to be rebuilt
//! - `FsSnapshotStore`: JSON file backend with atomic replace
//! - `fakes::MemorySnapshotStore`: in-memory backend for tests

mod error;
pub mod fakes;
pub mod fs;
mod schema;
pub mod storage_traits;

pub use error::StorageError;
pub use fs::FsSnapshotStore;
pub use schema::{
    HallRecord, RosterSnapshot, StudentRecord, ViolationRecord, SNAPSHOT_SCHEMA_VERSION,
};
pub use storage_traits::{ContentDigest, SnapshotStore, StorageResult};
