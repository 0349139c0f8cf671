//! Classroom Network Library
//!
//! Provides the TCP transport between agents and the classroom coordinator.
//!
//! # Architecture
//!
//! - **Server**: Owns the listener and applies each request to a shared
//!   [`classroom_core::ClassroomCoordinator`]
//! - **Client**: Request/response proxy used by door and teacher agents
//! - **Protocol**: Length-prefixed JSON messages
//!
//! # Usage
//!
//! ```ignore
//! let coordinator = Arc::new(ClassroomCoordinator::new(3));
//! let server = Server::start(addr, coordinator).await?;
//!
//! let mut client = ClassroomClient::connect(server.addr()).await?;
//! let id = client.issue_unique_id().await?;
//! ```

pub mod client;
pub mod error;
mod frame;
pub mod protocol;
pub mod server;

pub use client::ClassroomClient;
pub use error::{Error, Result};
pub use protocol::{Request, Response};
pub use server::Server;

/// Default port for classroom servers
pub const DEFAULT_PORT: u16 = 5000;
