//! Fault taxonomy
//!
//! Two layers of errors live here:
//! - `FaultInfo`: the serializable error *value* that crosses suspension
//!   boundaries (what `throw` injects, what a failed external operation
//!   delivers, what a failed task exposes as its outcome).
//! - `Fault`: the error type returned by coroutine, continuation, scheduler
//!   and driver operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error value with code and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultInfo {
    pub code: String,
    pub message: String,
}

impl FaultInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The code used for cancellation faults injected at a suspend point.
    pub const CANCELLED: &'static str = "Cancelled";

    /// A cancellation fault for the given task.
    pub fn cancelled(task_id: &str) -> Self {
        Self::new(Self::CANCELLED, format!("task {} cancelled", task_id))
    }

    pub fn is_cancellation(&self) -> bool {
        self.code == Self::CANCELLED
    }
}

impl fmt::Display for FaultInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Faults raised by the coroutine state machine and the layers above it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// An operation was requested in a state that does not permit it.
    #[error("invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// A continuation was invoked more than once. Always fatal, never a no-op.
    #[error("continuation for task {task} (suspension {suspension}) invoked more than once")]
    DoubleInvocation { task: String, suspension: u64 },

    /// A fault raised inside a computation that nothing caught.
    #[error("{0}")]
    Propagated(FaultInfo),

    /// The suspension this operation belongs to was pre-empted by cancellation.
    #[error("task {task} cancelled")]
    Cancelled { task: String },

    /// The driver ran out of events or ticks while a task was still pending.
    #[error("task {task} stalled: {reason}")]
    Stalled { task: String, reason: String },
}

impl Fault {
    pub fn invalid_state(operation: &'static str, state: impl fmt::Display) -> Self {
        Fault::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// The payload form of this fault, for delivery into a frame or a task
    /// outcome.
    pub fn to_info(&self) -> FaultInfo {
        match self {
            Fault::Propagated(info) => info.clone(),
            Fault::InvalidState { .. } => FaultInfo::new("InvalidState", self.to_string()),
            Fault::DoubleInvocation { .. } => FaultInfo::new("DoubleInvocation", self.to_string()),
            Fault::Cancelled { .. } => FaultInfo::new(FaultInfo::CANCELLED, self.to_string()),
            Fault::Stalled { .. } => FaultInfo::new("Stalled", self.to_string()),
        }
    }
}
