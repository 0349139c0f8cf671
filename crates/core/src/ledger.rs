//! Vote ledgers
//!
//! One ledger tracks one pending decision (start or end). A teacher holds at
//! most one entry; voting again overwrites it.

use std::collections::HashMap;

/// Votes recorded for a single pending decision, keyed by teacher ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteLedger {
    votes: HashMap<i64, bool>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote, replacing any earlier vote by the same teacher.
    /// Returns the previous vote if there was one.
    pub fn record(&mut self, teacher_id: i64, vote: bool) -> Option<bool> {
        self.votes.insert(teacher_id, vote)
    }

    /// Vote cast by a teacher, if any
    pub fn get(&self, teacher_id: i64) -> Option<bool> {
        self.votes.get(&teacher_id).copied()
    }

    /// Number of distinct voters
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Number of affirmative votes
    pub fn yes_count(&self) -> usize {
        self.votes.values().filter(|v| **v).count()
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, bool)> + '_ {
        self.votes.iter().map(|(id, vote)| (*id, *vote))
    }
}

impl FromIterator<(i64, bool)> for VoteLedger {
    fn from_iter<I: IntoIterator<Item = (i64, bool)>>(iter: I) -> Self {
        Self {
            votes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revote_overwrites() {
        let mut ledger = VoteLedger::new();
        assert_eq!(ledger.record(1, true), None);
        assert_eq!(ledger.record(1, true), Some(true));
        assert_eq!(ledger.len(), 1);

        assert_eq!(ledger.record(1, false), Some(true));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(1), Some(false));
        assert_eq!(ledger.yes_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut ledger: VoteLedger = [(1, true), (2, false)].into_iter().collect();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.yes_count(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.get(1), None);
    }
}
