//! Network protocol message types
//!
//! Every request gets exactly one response, in order, on the same
//! connection. All messages are JSON-serialized and length-prefixed on the
//! wire.

use classroom_core::{ClassroomSnapshot, DoorReport, Teacher};
use serde::{Deserialize, Serialize};

/// Calls an agent can make on the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Register and receive a fresh ID
    IssueUniqueId,

    /// Door reports a batch of arriving (or leaving) students
    ReportStudents { report: DoorReport },

    /// Are there enough students to begin a start vote
    CanStartVoting,

    IsSessionActive,

    VoteToStart { teacher: Teacher },

    VoteToEnd { teacher: Teacher },

    /// Full coordinator snapshot, for operators
    Status,

    /// Liveness check
    Ping,
}

/// Replies from the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    UniqueId { id: i64 },

    /// Request applied, nothing to return
    Accepted,

    /// Boolean answer (gate checks and vote outcomes)
    Flag { value: bool },

    Status { snapshot: ClassroomSnapshot },

    /// The coordinator refused the request
    Rejected { error: classroom_core::Error },

    Pong,
}

impl Request {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Request::IssueUniqueId => "issue_unique_id",
            Request::ReportStudents { .. } => "report_students",
            Request::CanStartVoting => "can_start_voting",
            Request::IsSessionActive => "is_session_active",
            Request::VoteToStart { .. } => "vote_to_start",
            Request::VoteToEnd { .. } => "vote_to_end",
            Request::Status => "status",
            Request::Ping => "ping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_request_wire_shape() {
        let teacher = Teacher {
            has_voted_to_start: true,
            ..Teacher::new("Alice").with_id(2)
        };
        let json = serde_json::to_value(Request::VoteToStart { teacher }).unwrap();

        assert_eq!(json["type"], "VoteToStart");
        assert_eq!(json["teacher"]["teacher_id"], 2);
        assert_eq!(json["teacher"]["has_voted_to_start"], true);
        assert_eq!(json["teacher"]["name"], "Alice");
    }

    #[test]
    fn test_rejection_carries_error() {
        let response = Response::Rejected {
            error: classroom_core::Error::UnknownTeacher(9),
        };
        let bytes = serde_json::to_vec(&response).unwrap();
        let decoded: Response = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, response);
    }

    #[test]
    fn test_request_names() {
        assert_eq!(Request::Ping.name(), "ping");
        assert_eq!(
            Request::ReportStudents {
                report: DoorReport::new(1, 3, "main")
            }
            .name(),
            "report_students"
        );
    }
}
