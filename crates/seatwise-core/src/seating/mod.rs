//! Seating arrangement generation.
//!
//! Places a roster into the seats of one or more halls so that students who
//! could collude sit apart. Same-subject neighbours are the primary cost,
//! neighbouring High-risk students the secondary one.
//!
//! # Module layout
//!
//! - [`config`]: `EngineConfig`, `CostWeights`, `HallOrder`
//! - [`conflict`]: `SeatingCandidate` and the implicit conflict graph
//! - [`layout`]: flattened seat list with 4-neighbour adjacency
//! - [`search`]: greedy construction, local search, seeded restarts
//! - [`seed`]: input digest and deterministic RNG seed
//! - [`arrangement`]: `ArrangementResult`, the read-only output
//! - [`engine`]: `SeatingEngine::generate`
//! - [`error`]: `SeatingError`, `GenerationWarning`

pub mod arrangement;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub(crate) mod layout;
pub(crate) mod search;
pub mod seed;

pub use arrangement::{ArrangementEntry, ArrangementResult, ArrangementSummary};
pub use config::{CostWeights, EngineConfig, HallOrder};
pub use conflict::SeatingCandidate;
pub use engine::{SeatingEngine, MAX_TOTAL_SEATS};
pub use error::{GenerationWarning, SeatingError, SeatingResult};
