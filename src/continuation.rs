//! One-shot continuations
//!
//! A continuation captures exactly one suspension of a task. Invoking it
//! resumes the task's root coroutine with a success value (`fire`) or a fault
//! (`fire_fault`). At most one invocation ever succeeds; a second one is a
//! `DoubleInvocation` fault, reported and logged, never silently dropped.
//!
//! The continuation holds only a weak back reference to its task. The
//! scheduler owns the task's lifetime; a continuation has no existence
//! independent of the one suspension it was minted for.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use crate::errors::{Fault, FaultInfo};
use crate::scheduler::task::TaskCore;
use crate::scheduler::{self, ResumeWith};
use crate::values::Val;

/// Shared one-shot state for a single suspension. Every clone of a
/// continuation, and the task's cancel path, goes through the same gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    /// Waiting for exactly one invocation.
    Armed,
    /// Consumed by a fire or an injected fault.
    Fired,
    /// Pre-empted by cancellation; a later fire is benign.
    Cancelled,
}

/// Cancellation observer for registrars.
///
/// External operations can check this before doing work whose result nobody
/// will consume anymore.
#[derive(Clone)]
pub struct CancelToken {
    gate: Rc<Cell<Gate>>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.gate.get() == Gate::Cancelled
    }
}

/// One-shot handle that resumes a specific suspended task.
///
/// Cloneable so a registrar can capture it in both a success path and a
/// failure path; all clones share the same gate.
#[derive(Clone)]
pub struct Continuation {
    task: Weak<RefCell<TaskCore>>,
    task_id: String,
    gate: Rc<Cell<Gate>>,
    suspension: u64,
}

impl Continuation {
    pub(crate) fn new(
        task: Weak<RefCell<TaskCore>>,
        task_id: String,
        gate: Rc<Cell<Gate>>,
        suspension: u64,
    ) -> Self {
        Self {
            task,
            task_id,
            gate,
            suspension,
        }
    }

    /// The id of the task this continuation resumes.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Token for observing whether this suspension has been cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            gate: self.gate.clone(),
        }
    }

    /// Resume the task with a success value.
    pub fn fire(&self, value: Val) -> Result<(), Fault> {
        self.consume(ResumeWith::Value(value))
    }

    /// Resume the task by injecting a fault at its suspend point.
    pub fn fire_fault(&self, fault: FaultInfo) -> Result<(), Fault> {
        self.consume(ResumeWith::Fault(fault))
    }

    fn consume(&self, with: ResumeWith) -> Result<(), Fault> {
        match self.gate.get() {
            Gate::Fired => {
                error!(
                    task = %self.task_id,
                    suspension = self.suspension,
                    "continuation invoked more than once"
                );
                Err(Fault::DoubleInvocation {
                    task: self.task_id.clone(),
                    suspension: self.suspension,
                })
            }
            Gate::Cancelled => {
                // Late completion of an operation whose suspension was
                // pre-empted; the external side did nothing wrong.
                debug!(
                    task = %self.task_id,
                    suspension = self.suspension,
                    "continuation fired after cancellation"
                );
                Err(Fault::Cancelled {
                    task: self.task_id.clone(),
                })
            }
            Gate::Armed => {
                self.gate.set(Gate::Fired);

                let Some(core) = self.task.upgrade() else {
                    return Err(Fault::invalid_state("fire continuation", "dropped task"));
                };

                scheduler::advance(&core, with)
            }
        }
    }
}
