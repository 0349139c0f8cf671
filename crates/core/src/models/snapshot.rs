use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the coordinator, taken under its lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomSnapshot {
    pub session_active: bool,
    pub student_count: i64,
    pub pending_students: i64,
    pub start_threshold: i64,
    /// Number of IDs handed out so far (also the quorum size)
    pub issued_ids: i64,
    pub start_votes: usize,
    pub end_votes: usize,
    pub last_transition: Option<DateTime<Utc>>,
}
