//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible coordinator states during
//! development. These checks are compiled out in release builds.

use crate::ledger::VoteLedger;
use crate::state::ClassroomState;

/// Validate that the session fields are internally consistent
pub fn assert_state_invariants(state: &ClassroomState) {
    debug_assert!(
        state.student_count >= 0,
        "Student count went negative: {}",
        state.student_count
    );
}

/// Validate that a ledger only holds votes from issued IDs
pub fn assert_ledger_invariants(ledger: &VoteLedger, issued_ids: i64, context: &str) {
    debug_assert!(
        ledger.len() as i64 <= issued_ids,
        "{} ledger has {} voters but only {} IDs were issued",
        context,
        ledger.len(),
        issued_ids
    );

    debug_assert!(
        ledger.iter().all(|(id, _)| id > 0 && id <= issued_ids),
        "{} ledger holds a vote from an ID that was never issued",
        context
    );
}

/// Validate that a ledger was emptied by the transition it triggered
pub fn assert_ledger_cleared(ledger: &VoteLedger, context: &str) {
    debug_assert!(
        ledger.is_empty(),
        "{} ledger still holds {} votes after transition",
        context,
        ledger.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_state() {
        assert_state_invariants(&ClassroomState::default());
    }

    #[test]
    fn test_valid_ledger() {
        let ledger: VoteLedger = [(1, true), (2, false)].into_iter().collect();
        assert_ledger_invariants(&ledger, 2, "start");
    }

    #[test]
    #[should_panic(expected = "went negative")]
    fn test_negative_student_count() {
        let state = ClassroomState {
            student_count: -1,
            ..ClassroomState::default()
        };
        assert_state_invariants(&state);
    }

    #[test]
    #[should_panic(expected = "never issued")]
    fn test_vote_from_unissued_id() {
        let ledger: VoteLedger = [(1, true), (7, true)].into_iter().collect();
        assert_ledger_invariants(&ledger, 3, "end");
    }

    #[test]
    #[should_panic(expected = "after transition")]
    fn test_uncleared_ledger() {
        let ledger: VoteLedger = [(1, true)].into_iter().collect();
        assert_ledger_cleared(&ledger, "start");
    }
}
