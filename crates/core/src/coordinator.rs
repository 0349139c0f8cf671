//! Classroom coordinator
//!
//! The synchronized facade every remote call goes through. All mutable
//! state lives in one struct behind one mutex; each public operation holds
//! the lock for its whole body, so concurrent votes and reports are applied
//! atomically and in some total order.
//!
//! Session lifecycle:
//!
//! ```text
//! Gathering --(every issued ID voted, majority on start ledger)--> InSession
//! InSession --(every issued ID voted, majority on end ledger)----> Gathering
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::invariants::{assert_ledger_cleared, assert_ledger_invariants, assert_state_invariants};
use crate::ledger::VoteLedger;
use crate::models::{ClassroomSnapshot, DoorReport, Teacher};
use crate::state::ClassroomState;

/// Shared classroom coordinator, generic over the source of departures
pub struct ClassroomCoordinator<R = StdRng> {
    inner: Mutex<Inner<R>>,
}

/// Everything guarded by the coordinator lock
struct Inner<R> {
    state: ClassroomState,
    start_votes: VoteLedger,
    end_votes: VoteLedger,
    /// Last ID handed out; equals the number of registered teachers
    last_unique_id: i64,
    /// Students reported by doors, saturating at the `i64` bounds. Only
    /// read by the start-voting gate; never folded into `state.student_count`.
    pending_students: i64,
    last_transition: Option<DateTime<Utc>>,
    rng: R,
}

impl ClassroomCoordinator<StdRng> {
    /// Create a coordinator with an entropy-seeded random source
    pub fn new(start_threshold: i64) -> Self {
        Self::with_rng(ClassroomState::new(start_threshold), StdRng::from_entropy())
    }
}

impl<R: Rng> ClassroomCoordinator<R> {
    /// Create a coordinator from explicit initial state and random source
    pub fn with_rng(state: ClassroomState, rng: R) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                start_votes: VoteLedger::new(),
                end_votes: VoteLedger::new(),
                last_unique_id: 0,
                pending_students: 0,
                last_transition: None,
                rng,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        // Critical sections never leave the state half-updated before a
        // point that can panic, so a poisoned guard is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the next unique ID, starting at 1. IDs are never reused.
    pub fn issue_unique_id(&self) -> i64 {
        let mut inner = self.lock();
        inner.last_unique_id += 1;
        let id = inner.last_unique_id;
        info!(id = id, "Issued unique ID");
        id
    }

    /// Add a door's signed delta to the pending-student accumulator
    pub fn report_students(&self, report: &DoorReport) {
        let mut inner = self.lock();
        // Deltas come straight off the wire; saturate instead of overflowing
        inner.pending_students = inner
            .pending_students
            .saturating_add(report.amount_of_students);
        debug!(
            door_id = report.door_id,
            delta = report.amount_of_students,
            pending = inner.pending_students,
            "Door reported students"
        );
    }

    /// Whether enough students are waiting and no session is running
    pub fn can_start_voting(&self) -> bool {
        let inner = self.lock();
        let ready =
            inner.pending_students >= inner.state.start_threshold && !inner.state.session_active;
        if ready {
            info!(
                pending = inner.pending_students,
                "Enough students to start voting"
            );
        }
        ready
    }

    pub fn is_session_active(&self) -> bool {
        self.lock().state.session_active
    }

    /// Record a vote to start the class.
    ///
    /// Returns `true` only when this vote completed the round (every issued
    /// ID has voted) with a majority and the session started. Votes that
    /// arrive while a session is running are recorded but rejected.
    pub fn vote_to_start(&self, teacher: &Teacher) -> Result<bool> {
        let mut inner = self.lock();
        inner.validate(teacher)?;

        inner
            .start_votes
            .record(teacher.teacher_id, teacher.has_voted_to_start);

        if inner.state.session_active {
            info!(
                teacher_id = teacher.teacher_id,
                "Start vote ignored, class is already in session"
            );
            return Ok(false);
        }

        info!(
            teacher_id = teacher.teacher_id,
            vote = teacher.has_voted_to_start,
            "Teacher voted to start the class"
        );

        if !inner.quorum_reached(&inner.start_votes) {
            info!(
                voted = inner.start_votes.len(),
                issued = inner.last_unique_id,
                "Waiting for remaining start votes"
            );
            return Ok(false);
        }

        if ClassroomState::has_majority(&inner.start_votes) {
            inner.start_class();
            return Ok(true);
        }

        info!(
            yes = inner.start_votes.yes_count(),
            voted = inner.start_votes.len(),
            "Start votes were not sufficient"
        );
        Ok(false)
    }

    /// Record a vote to end the class.
    ///
    /// Unlike [`Self::vote_to_start`] there is no session gate: a vote landing
    /// after the class already ended is still recorded and evaluated.
    pub fn vote_to_end(&self, teacher: &Teacher) -> Result<bool> {
        let mut inner = self.lock();
        inner.validate(teacher)?;

        inner
            .end_votes
            .record(teacher.teacher_id, teacher.has_voted_to_end);

        info!(
            teacher_id = teacher.teacher_id,
            vote = teacher.has_voted_to_end,
            "Teacher voted to end the class"
        );

        if !inner.quorum_reached(&inner.end_votes) {
            return Ok(false);
        }

        if ClassroomState::has_majority(&inner.end_votes) {
            inner.end_class();
            return Ok(true);
        }

        info!(
            yes = inner.end_votes.yes_count(),
            voted = inner.end_votes.len(),
            "End votes were not sufficient"
        );
        Ok(false)
    }

    /// Consistent view of every field, taken under the lock
    pub fn snapshot(&self) -> ClassroomSnapshot {
        let inner = self.lock();
        ClassroomSnapshot {
            session_active: inner.state.session_active,
            student_count: inner.state.student_count,
            pending_students: inner.pending_students,
            start_threshold: inner.state.start_threshold,
            issued_ids: inner.last_unique_id,
            start_votes: inner.start_votes.len(),
            end_votes: inner.end_votes.len(),
            last_transition: inner.last_transition,
        }
    }
}

impl<R: Rng> Inner<R> {
    /// Reject IDs that were never issued
    fn validate(&self, teacher: &Teacher) -> Result<()> {
        if teacher.teacher_id <= 0 {
            return Err(Error::Validation(format!(
                "teacher {:?} has no issued ID ({})",
                teacher.name, teacher.teacher_id
            )));
        }
        if teacher.teacher_id > self.last_unique_id {
            return Err(Error::UnknownTeacher(teacher.teacher_id));
        }
        Ok(())
    }

    /// Every teacher ever issued an ID has a vote in the ledger
    fn quorum_reached(&self, ledger: &VoteLedger) -> bool {
        assert_ledger_invariants(ledger, self.last_unique_id, "vote");
        ledger.len() as i64 == self.last_unique_id
    }

    fn start_class(&mut self) {
        self.state.session_active = true;
        self.start_votes.clear();
        self.last_transition = Some(Utc::now());

        assert_ledger_cleared(&self.start_votes, "start");
        info!("Class has started");
    }

    fn end_class(&mut self) {
        self.state.session_active = false;
        self.end_votes.clear();
        self.last_transition = Some(Utc::now());

        let present = self.state.student_count;
        let departing = if present > 0 {
            self.rng.gen_range(1..=present)
        } else {
            0
        };
        self.state.remove_students(departing);

        assert_ledger_cleared(&self.end_votes, "end");
        assert_state_invariants(&self.state);
        info!(
            departed = departing,
            remaining = self.state.student_count,
            "Class has ended"
        );
    }
}
