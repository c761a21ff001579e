//! Continuation-based async scheduler
//!
//! `begin_async` transfers control to a coroutine body until it either
//! suspends itself for the first time or completes, at which point
//! `begin_async` returns. Each suspension yields a pending-operation
//! descriptor; the scheduler mints a one-shot continuation, hands it to the
//! operation's registrar, and resumes the coroutine when the continuation
//! fires. The cycle repeats until the coroutine reaches a terminal state and
//! the task settles with the same outcome.
//!
//! Nested tasks need no special treatment: `TaskHandle::registrar()` adapts
//! a child task's settlement into the same continuation-firing protocol as a
//! raw external operation.

pub mod op;
pub mod task;

#[cfg(test)]
mod tests;

pub use op::{AsyncYield, Registrar};
pub use task::TaskHandle;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::continuation::{Continuation, Gate};
use crate::coroutine::{Coroutine, Frame, Step};
use crate::errors::{Fault, FaultInfo};
use crate::types::{TaskOutcome, TaskStatus};
use crate::values::Val;

use task::TaskCore;

/// What a continuation resumes the root coroutine with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResumeWith {
    Value(Val),
    Fault(FaultInfo),
}

/// Begin an asynchronous task with the default configuration.
///
/// Returns once the body has suspended for the first time or completed;
/// the caller's flow of control is never blocked on external events. A fault
/// raised before the first suspension is rethrown from here instead of being
/// routed to the completion channel.
pub fn begin_async(
    frame: impl Frame<Val, AsyncYield, Val> + 'static,
) -> Result<TaskHandle, Fault> {
    begin_async_with(frame, Config::default())
}

/// Begin an asynchronous task with an explicit configuration.
pub fn begin_async_with(
    frame: impl Frame<Val, AsyncYield, Val> + 'static,
    config: Config,
) -> Result<TaskHandle, Fault> {
    let core = Rc::new(RefCell::new(TaskCore {
        id: Uuid::new_v4().to_string(),
        co: None,
        status: TaskStatus::Running,
        outcome: None,
        waiters: Vec::new(),
        pending_gate: None,
        suspensions: 0,
        resume_depth: 0,
        config,
    }));
    let handle = TaskHandle::from_core(core.clone());

    debug!(task = %handle.id(), "beginning async task");

    let mut co = Coroutine::new(frame);
    let first = co.start();
    progress(&core, co, first)?;

    Ok(handle)
}

/// Resume a suspended task. Called from a continuation that just consumed
/// its gate, or from the cancel path.
pub(crate) fn advance(core: &Rc<RefCell<TaskCore>>, with: ResumeWith) -> Result<(), Fault> {
    let (mut co, overflowed) = {
        let mut task = core.borrow_mut();

        match task.status {
            TaskStatus::Suspended => {}
            ref other => return Err(Fault::invalid_state("resume task", other)),
        }

        task.resume_depth += 1;
        let overflowed = task.resume_depth > task.config.max_sync_resumes;

        task.status = TaskStatus::Running;
        task.pending_gate = None;

        let co = task
            .co
            .take()
            .ok_or_else(|| Fault::invalid_state("resume task", "missing coroutine"))?;

        (co, overflowed)
    };

    if overflowed {
        // A registrar chain kept firing synchronously; fail the task instead
        // of overflowing the stack.
        settle(
            core,
            TaskOutcome::Failure(FaultInfo::new(
                "SyncResumeOverflow",
                "too many synchronous continuation resumes",
            )),
        );
        core.borrow_mut().resume_depth -= 1;
        return Ok(());
    }

    let step = match with {
        ResumeWith::Value(value) => co.next(value),
        ResumeWith::Fault(fault) => co.throw(fault),
    };

    let result = progress(core, co, step);
    core.borrow_mut().resume_depth -= 1;
    result
}

/// Pre-empt the pending suspension by injecting a cancellation fault through
/// its gate.
pub(crate) fn cancel(core: &Rc<RefCell<TaskCore>>) -> Result<(), Fault> {
    let (gate, task_id) = {
        let task = core.borrow();

        match task.status {
            TaskStatus::Suspended => {}
            ref other => return Err(Fault::invalid_state("cancel", other)),
        }

        let gate = task
            .pending_gate
            .clone()
            .ok_or_else(|| Fault::invalid_state("cancel", "no pending suspension"))?;

        (gate, task.id.clone())
    };

    // The normal fire for this suspension now reports Cancelled instead of
    // resuming; the injected fault below is the only resumption.
    gate.set(Gate::Cancelled);
    info!(task = %task_id, "cancelling pending suspension");

    advance(core, ResumeWith::Fault(FaultInfo::cancelled(&task_id)))
}

/// Drive the coroutine until it parks on an external operation or terminates.
///
/// `Immediate` yields resume in place without counting as suspensions, so a
/// fault raised on this path before any real suspension is rethrown to the
/// caller rather than settled through the completion channel.
fn progress(
    core: &Rc<RefCell<TaskCore>>,
    mut co: Coroutine<Val, AsyncYield, Val>,
    mut step: Result<Step<AsyncYield, Val>, Fault>,
) -> Result<(), Fault> {
    loop {
        match step {
            Ok(Step::Yielded(AsyncYield::Immediate(value))) => {
                step = co.next(value);
            }
            Ok(Step::Yielded(AsyncYield::Operation(register))) => {
                park(core, co, register);
                return Ok(());
            }
            Ok(Step::Complete(value)) => {
                settle(core, TaskOutcome::Success(value));
                return Ok(());
            }
            Err(Fault::Propagated(fault)) => {
                let before_first_suspension = core.borrow().suspensions == 0;
                settle(core, TaskOutcome::Failure(fault.clone()));
                return if before_first_suspension {
                    Err(Fault::Propagated(fault))
                } else {
                    Ok(())
                };
            }
            Err(other) => return Err(other),
        }
    }
}

/// Park the coroutine on a pending operation: store it back, mint a fresh
/// continuation for this suspension, and hand it to the registrar.
///
/// The registrar runs after the task borrow is released, so it may fire the
/// continuation synchronously; that re-enters `advance` by recursion, bounded
/// by `Config::max_sync_resumes`.
fn park(core: &Rc<RefCell<TaskCore>>, co: Coroutine<Val, AsyncYield, Val>, register: Registrar) {
    let continuation = {
        let mut task = core.borrow_mut();

        task.co = Some(co);
        task.status = TaskStatus::Suspended;
        task.suspensions += 1;

        let gate = Rc::new(Cell::new(Gate::Armed));
        task.pending_gate = Some(gate.clone());

        debug!(task = %task.id, suspension = task.suspensions, "task suspended");

        Continuation::new(
            Rc::downgrade(core),
            task.id.clone(),
            gate,
            task.suspensions,
        )
    };

    register(continuation);
}

/// Settle the task and notify waiters. Hooks run after the borrow is
/// released; a hook may re-enter the scheduler (a parent task awaiting this
/// one resumes here).
fn settle(core: &Rc<RefCell<TaskCore>>, outcome: TaskOutcome) {
    let (hooks, task_id) = {
        let mut task = core.borrow_mut();

        task.status = match outcome {
            TaskOutcome::Success(_) => TaskStatus::Completed,
            TaskOutcome::Failure(_) => TaskStatus::Failed,
        };
        task.outcome = Some(outcome.clone());
        task.pending_gate = None;

        (std::mem::take(&mut task.waiters), task.id.clone())
    };

    match &outcome {
        TaskOutcome::Success(_) => info!(task = %task_id, "task completed"),
        TaskOutcome::Failure(fault) => {
            info!(task = %task_id, code = %fault.code, "task failed")
        }
    }

    for hook in hooks {
        hook(&outcome);
    }
}
