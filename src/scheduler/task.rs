//! Task state and handles
//!
//! A task is one `begin_async` invocation: it exclusively owns a root
//! coroutine and is driven through continuations until the coroutine reaches
//! a terminal state, at which point the task settles with the same outcome.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::Config;
use crate::continuation::Gate;
use crate::coroutine::Coroutine;
use crate::errors::Fault;
use crate::scheduler::op::{AsyncYield, Registrar};
use crate::types::{TaskOutcome, TaskStatus};
use crate::values::Val;

pub(crate) type SettledHook = Box<dyn FnOnce(&TaskOutcome)>;

/// Internal state of a task. The coroutine slot is taken while the frame is
/// advancing so body code can observe the task through handles without
/// aliasing the frame.
pub(crate) struct TaskCore {
    pub(crate) id: String,
    pub(crate) co: Option<Coroutine<Val, AsyncYield, Val>>,
    pub(crate) status: TaskStatus,
    pub(crate) outcome: Option<TaskOutcome>,
    pub(crate) waiters: Vec<SettledHook>,
    /// Gate of the current suspension, if any.
    pub(crate) pending_gate: Option<Rc<Cell<Gate>>>,
    /// Ordinal of the most recent suspension, for diagnostics.
    pub(crate) suspensions: u64,
    /// Depth of re-entrant resumes from synchronously fired continuations.
    pub(crate) resume_depth: usize,
    pub(crate) config: Config,
}

/// External observer of a task: status, outcome, settlement hooks and
/// cancellation. Cloning shares the underlying task.
#[derive(Clone)]
pub struct TaskHandle {
    core: Rc<RefCell<TaskCore>>,
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("TaskHandle")
            .field("id", &core.id)
            .field("status", &core.status)
            .finish()
    }
}

impl TaskHandle {
    pub(crate) fn from_core(core: Rc<RefCell<TaskCore>>) -> Self {
        Self { core }
    }

    pub fn id(&self) -> String {
        self.core.borrow().id.clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.core.borrow().status.clone()
    }

    pub fn is_settled(&self) -> bool {
        self.core.borrow().status.is_settled()
    }

    /// The terminal outcome, once settled.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.core.borrow().outcome.clone()
    }

    /// Observe settlement exactly once. If the task has already settled the
    /// hook runs immediately; otherwise it runs when the task settles.
    pub fn on_settled(&self, hook: impl FnOnce(&TaskOutcome) + 'static) {
        let settled = self.core.borrow().outcome.clone();
        match settled {
            Some(outcome) => hook(&outcome),
            None => self.core.borrow_mut().waiters.push(Box::new(hook)),
        }
    }

    /// Adapt this task into the registrar protocol, so a parent coroutine can
    /// await it exactly like a raw external operation.
    ///
    /// A parent awaiting a failed child observes the child's fault itself,
    /// not a wrapper.
    pub fn registrar(&self) -> Registrar {
        let child = self.clone();
        Box::new(move |continuation| {
            child.on_settled(move |outcome| {
                match outcome {
                    TaskOutcome::Success(value) => continuation.fire(value.clone()),
                    TaskOutcome::Failure(fault) => continuation.fire_fault(fault.clone()),
                }
                .ok(); // a parent cancelled before the child settles is fine
            });
        })
    }

    /// Pre-empt the pending suspension with a cancellation fault.
    ///
    /// The fault is injected at the suspend point, so the body may catch it
    /// and clean up; uncaught, the task fails with it. Valid only while the
    /// task is suspended.
    pub fn cancel(&self) -> Result<(), Fault> {
        super::cancel(&self.core)
    }
}
