//! TCP server exposing the classroom coordinator
//!
//! Each connection is served by its own task. Tasks share one coordinator;
//! its internal lock is what orders concurrent calls, so the server itself
//! holds no state of its own.

use std::net::SocketAddr;
use std::sync::Arc;

use classroom_core::ClassroomCoordinator;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// Running server handle
pub struct Server {
    addr: SocketAddr,
    coordinator: Arc<ClassroomCoordinator>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Bind to `addr` (port 0 picks a free port) and start accepting agents
    pub async fn start(addr: SocketAddr, coordinator: Arc<ClassroomCoordinator>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let bound_addr = listener.local_addr()?;

        info!(addr = %bound_addr, "Server started");

        let (shutdown_tx, _) = broadcast::channel(1);

        tokio::spawn(accept_loop(
            listener,
            coordinator.clone(),
            shutdown_tx.clone(),
        ));

        Ok(Server {
            addr: bound_addr,
            coordinator,
            shutdown_tx,
        })
    }

    /// Get the server's bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Coordinator served by this server
    pub fn coordinator(&self) -> &Arc<ClassroomCoordinator> {
        &self.coordinator
    }

    /// Stop accepting and close every open connection
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("Server shutdown initiated");
    }
}

/// Accept incoming connections
async fn accept_loop(
    listener: TcpListener,
    coordinator: Arc<ClassroomCoordinator>,
    shutdown_tx: broadcast::Sender<()>,
) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let conn_id = Uuid::new_v4();
                        debug!(addr = %addr, conn_id = %conn_id, "New connection");
                        tokio::spawn(handle_connection(
                            stream,
                            addr,
                            conn_id,
                            coordinator.clone(),
                            shutdown_tx.subscribe(),
                        ));
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Accept loop shutting down");
                break;
            }
        }
    }
}

/// Serve requests from one agent until it disconnects
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    conn_id: Uuid,
    coordinator: Arc<ClassroomCoordinator>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    info!(addr = %addr, conn_id = %conn_id, "Agent connected");

    loop {
        tokio::select! {
            result = serve_one(&mut reader, &mut writer, &coordinator, conn_id) => {
                match result {
                    Ok(()) => {}
                    Err(Error::ConnectionClosed) => {
                        debug!(conn_id = %conn_id, "Connection closed");
                        break;
                    }
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "Connection error");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!(conn_id = %conn_id, "Closing connection for shutdown");
                break;
            }
        }
    }

    info!(addr = %addr, conn_id = %conn_id, "Agent disconnected");
}

/// Read one request, apply it, write its response
async fn serve_one(
    reader: &mut ReadHalf<TcpStream>,
    writer: &mut WriteHalf<TcpStream>,
    coordinator: &ClassroomCoordinator,
    conn_id: Uuid,
) -> Result<()> {
    let request: Request = read_frame(reader).await?;
    debug!(conn_id = %conn_id, request = request.name(), "Handling request");

    let response = dispatch(coordinator, request);
    write_frame(writer, &response).await
}

/// Apply a request to the coordinator. Each call completes synchronously
/// under the coordinator lock.
pub fn dispatch(coordinator: &ClassroomCoordinator, request: Request) -> Response {
    match request {
        Request::IssueUniqueId => Response::UniqueId {
            id: coordinator.issue_unique_id(),
        },
        Request::ReportStudents { report } => {
            coordinator.report_students(&report);
            Response::Accepted
        }
        Request::CanStartVoting => Response::Flag {
            value: coordinator.can_start_voting(),
        },
        Request::IsSessionActive => Response::Flag {
            value: coordinator.is_session_active(),
        },
        Request::VoteToStart { teacher } => vote_response(coordinator.vote_to_start(&teacher)),
        Request::VoteToEnd { teacher } => vote_response(coordinator.vote_to_end(&teacher)),
        Request::Status => Response::Status {
            snapshot: coordinator.snapshot(),
        },
        Request::Ping => Response::Pong,
    }
}

fn vote_response(result: classroom_core::Result<bool>) -> Response {
    match result {
        Ok(value) => Response::Flag { value },
        Err(error) => {
            warn!(error = %error, "Vote rejected");
            Response::Rejected { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classroom_core::{DoorReport, Teacher};

    #[tokio::test]
    async fn test_server_start() {
        let coordinator = Arc::new(ClassroomCoordinator::new(3));
        let server = Server::start(SocketAddr::from(([127, 0, 0, 1], 0)), coordinator)
            .await
            .unwrap();

        assert!(server.addr().port() > 0);
        server.shutdown();
    }

    #[test]
    fn test_dispatch_issue_and_report() {
        let coordinator = ClassroomCoordinator::new(3);

        assert_eq!(
            dispatch(&coordinator, Request::IssueUniqueId),
            Response::UniqueId { id: 1 }
        );
        assert_eq!(
            dispatch(
                &coordinator,
                Request::ReportStudents {
                    report: DoorReport::new(1, 4, "main")
                }
            ),
            Response::Accepted
        );
        assert_eq!(
            dispatch(&coordinator, Request::CanStartVoting),
            Response::Flag { value: true }
        );
    }

    #[test]
    fn test_dispatch_rejects_unregistered_vote() {
        let coordinator = ClassroomCoordinator::new(3);
        let response = dispatch(
            &coordinator,
            Request::VoteToStart {
                teacher: Teacher::new("Bob"),
            },
        );

        assert!(matches!(
            response,
            Response::Rejected {
                error: classroom_core::Error::Validation(_)
            }
        ));
    }
}
