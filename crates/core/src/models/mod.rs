//! Values exchanged between agents and the coordinator

mod door;
mod snapshot;
mod teacher;

pub use door::DoorReport;
pub use snapshot::ClassroomSnapshot;
pub use teacher::Teacher;
