//! TCP client used by door and teacher agents
//!
//! A thin proxy: one method per remote operation, each sending a single
//! request and waiting for its response.

use std::net::SocketAddr;

use classroom_core::{ClassroomSnapshot, DoorReport, Teacher};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// Connection to a classroom server
pub struct ClassroomClient {
    addr: SocketAddr,
    reader: ReadHalf<TcpStream>,
    writer: WriteHalf<TcpStream>,
}

impl ClassroomClient {
    /// Connect to a classroom server
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = tokio::io::split(stream);

        info!(addr = %addr, "Connected to classroom server");

        Ok(Self {
            addr,
            reader,
            writer,
        })
    }

    /// Address of the server this client talks to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Send one request and wait for its response
    pub async fn call(&mut self, request: Request) -> Result<Response> {
        debug!(request = request.name(), "Sending request");
        write_frame(&mut self.writer, &request).await?;
        let response: Response = read_frame(&mut self.reader).await?;
        match response {
            Response::Rejected { error } => Err(Error::Coordinator(error)),
            response => Ok(response),
        }
    }

    async fn call_flag(&mut self, request: Request) -> Result<bool> {
        match self.call(request).await? {
            Response::Flag { value } => Ok(value),
            other => Err(unexpected(&other)),
        }
    }

    /// Register with the coordinator and get a fresh ID
    pub async fn issue_unique_id(&mut self) -> Result<i64> {
        match self.call(Request::IssueUniqueId).await? {
            Response::UniqueId { id } => Ok(id),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn report_students(&mut self, report: &DoorReport) -> Result<()> {
        let request = Request::ReportStudents {
            report: report.clone(),
        };
        match self.call(request).await? {
            Response::Accepted => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn can_start_voting(&mut self) -> Result<bool> {
        self.call_flag(Request::CanStartVoting).await
    }

    pub async fn is_session_active(&mut self) -> Result<bool> {
        self.call_flag(Request::IsSessionActive).await
    }

    /// Returns `true` if this vote started the class
    pub async fn vote_to_start(&mut self, teacher: &Teacher) -> Result<bool> {
        self.call_flag(Request::VoteToStart {
            teacher: teacher.clone(),
        })
        .await
    }

    /// Returns `true` if this vote ended the class
    pub async fn vote_to_end(&mut self, teacher: &Teacher) -> Result<bool> {
        self.call_flag(Request::VoteToEnd {
            teacher: teacher.clone(),
        })
        .await
    }

    pub async fn status(&mut self) -> Result<ClassroomSnapshot> {
        match self.call(Request::Status).await? {
            Response::Status { snapshot } => Ok(snapshot),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn ping(&mut self) -> Result<()> {
        match self.call(Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &Response) -> Error {
    Error::UnexpectedResponse(format!("{:?}", response))
}
