//! Classroom Core Library
//!
//! The classroom coordination state machine: vote ledgers, majority
//! evaluation, session transitions and unique-ID issuance. Every remote
//! operation goes through [`ClassroomCoordinator`], which serializes access
//! to the shared state behind a single lock.

pub mod coordinator;
pub mod error;
pub mod invariants;
pub mod ledger;
pub mod models;
pub mod state;

pub use coordinator::ClassroomCoordinator;
pub use error::{Error, Result};
pub use ledger::VoteLedger;
pub use models::*;
pub use state::{ClassroomState, DEFAULT_START_THRESHOLD};
