use serde::{Deserialize, Serialize};

/// Batch of students reported by a door agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorReport {
    pub door_id: i64,
    /// Signed delta; negative values mean students walked away
    pub amount_of_students: i64,
    pub is_closed: bool,
    pub is_opened: bool,
    pub description: String,
}

impl DoorReport {
    pub fn new(door_id: i64, amount_of_students: i64, description: impl Into<String>) -> Self {
        Self {
            door_id,
            amount_of_students,
            is_closed: false,
            is_opened: true,
            description: description.into(),
        }
    }
}
