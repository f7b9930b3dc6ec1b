mod change_event;
mod topic;

pub use change_event::{ChangeEvent, RowPayload, Table};
pub use topic::Topic;
