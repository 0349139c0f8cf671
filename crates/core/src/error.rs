//! Error types for Classroom Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the coordinator. Serializable so the transport can
/// hand them back to the calling agent unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown teacher: {0} was never issued by this coordinator")]
    UnknownTeacher(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
