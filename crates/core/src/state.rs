//! Raw classroom session fields and majority evaluation

use crate::ledger::VoteLedger;

/// Pending students required before teachers may start a vote
pub const DEFAULT_START_THRESHOLD: i64 = 3;

/// Session fields owned by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomState {
    /// Whether the class is currently in session
    pub session_active: bool,
    /// Students currently in the room, never negative
    pub student_count: i64,
    /// Minimum pending students before start-voting is allowed
    pub start_threshold: i64,
}

impl ClassroomState {
    pub fn new(start_threshold: i64) -> Self {
        Self {
            session_active: false,
            student_count: 0,
            start_threshold,
        }
    }

    /// Whether strictly more than half of the ledger's votes are affirmative.
    ///
    /// A ledger with one vote or none never carries a majority, so a
    /// deployment with a single teacher can never change the session.
    pub fn has_majority(ledger: &VoteLedger) -> bool {
        let total = ledger.len();
        if total <= 1 {
            return false;
        }
        // yes / total > 0.5, kept in integers so ties are exact
        ledger.yes_count() * 2 > total
    }

    /// Remove departing students, clamping at zero
    pub fn remove_students(&mut self, departing: i64) {
        self.student_count = (self.student_count - departing).max(0);
    }
}

impl Default for ClassroomState {
    fn default() -> Self {
        Self::new(DEFAULT_START_THRESHOLD)
    }
}
