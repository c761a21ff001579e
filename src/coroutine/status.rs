//! Coroutine lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a coroutine.
///
/// Legal transitions:
/// Created -> Running, Running -> Suspended, Running -> Completed,
/// Running -> Failed, Suspended -> Running. Any other requested transition
/// is an `InvalidState` fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoroutineState {
    /// Created but never started.
    Created,
    /// Currently advancing between two suspend points.
    Running,
    /// Paused at a suspend point, waiting for `next` or `throw`.
    Suspended,
    /// Finished normally. The frame has been released.
    Completed,
    /// Finished with an uncaught fault. The frame has been released.
    Failed,
}

impl CoroutineState {
    /// True once the frame has been released and no resumption is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CoroutineState::Completed | CoroutineState::Failed)
    }
}

impl fmt::Display for CoroutineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoroutineState::Created => "created",
            CoroutineState::Running => "running",
            CoroutineState::Suspended => "suspended",
            CoroutineState::Completed => "completed",
            CoroutineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
