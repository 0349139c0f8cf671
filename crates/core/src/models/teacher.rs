use serde::{Deserialize, Serialize};

/// Teacher record sent along with every vote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Issued by the coordinator; 0 until the teacher registers
    pub teacher_id: i64,
    /// Vote cast in the current start round
    pub has_voted_to_start: bool,
    /// Vote cast in the current end round
    pub has_voted_to_end: bool,
    pub name: String,
}

impl Teacher {
    /// Create an unregistered teacher
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the coordinator has issued an ID to this teacher
    pub fn is_registered(&self) -> bool {
        self.teacher_id != 0
    }

    /// Builder-style helper used by agents and tests
    pub fn with_id(mut self, teacher_id: i64) -> Self {
        self.teacher_id = teacher_id;
        self
    }
}
