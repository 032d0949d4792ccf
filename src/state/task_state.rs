/// Final states of a fetch-and-archive task
use std::fmt;

/// Where a link record ended up after a crawler run
///
/// The in-flight states (`Pending` while the dispatcher decides, `Fetching`
/// while a batch runs) only exist inside the coordinator; reports carry the
/// terminal state of every considered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    /// No request was made (already archived or a duplicate key)
    Skipped,

    /// Body fetched and written to the content store
    Archived,

    /// Attempts exhausted, or the store rejected the record
    Failed,
}

impl TaskState {
    /// Every state, in report order
    pub const ALL: [TaskState; 3] = [Self::Archived, Self::Skipped, Self::Failed];

    /// Lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Archived => "archived",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
