use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::FaultInfo;
use crate::values::Val;

/// Externally observable status of a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The root coroutine is currently advancing.
    Running,
    /// Waiting for the continuation of a pending external operation.
    Suspended,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Running => "running",
            TaskStatus::Suspended => "suspended",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of a task, observed through its completion channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskOutcome {
    Success(Val),
    Failure(FaultInfo),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}
