//! State module for archive task results
//!
//! Every link record handled by the crawler moves through
//! `Pending -> (Skipped | Fetching -> (Archived | Failed))`. The dispatcher
//! and the fetch loop own the in-flight part; this module names where a
//! record ends up.

mod task_state;

pub use task_state::TaskState;
