//! Network error types

use std::io;

/// Network result type
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Rejected by coordinator: {0}")]
    Coordinator(#[from] classroom_core::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
