//! Generic pump loops
//!
//! Two ways to run a suspendable computation to completion:
//!
//! - `drive` pumps a bare coroutine, answering each yielded value from a
//!   responder. This is the synchronous "step until done" loop.
//! - `block_on` pumps the event queue instead: the task's continuations do
//!   the resuming, the driver only moves virtual time forward until the task
//!   settles.

use tracing::debug;

use crate::clock::EventQueue;
use crate::config::Config;
use crate::coroutine::{Coroutine, Step};
use crate::errors::{Fault, FaultInfo};
use crate::scheduler::TaskHandle;
use crate::types::TaskOutcome;
use crate::values::Val;

/// Drive a coroutine to completion, answering every yielded value.
///
/// `respond` maps a yielded value to the next input, or to a fault to inject
/// at the suspend point. The loop ends at the coroutine's completion signal
/// and returns its final result; an uncaught fault ends the loop with that
/// fault.
pub fn drive<I, O, R>(
    co: &mut Coroutine<I, O, R>,
    mut respond: impl FnMut(O) -> Result<I, FaultInfo>,
) -> Result<R, Fault> {
    let mut step = co.start()?;

    loop {
        let yielded = match step {
            Step::Complete(result) => return Ok(result),
            Step::Yielded(value) => value,
        };

        step = match respond(yielded) {
            Ok(input) => co.next(input)?,
            Err(fault) => co.throw(fault)?,
        };
    }
}

/// Tick the event queue until the task settles, with the default tick budget.
pub fn block_on(task: &TaskHandle, events: &EventQueue) -> Result<Val, Fault> {
    block_on_with(task, events, &Config::default())
}

/// Tick the event queue until the task settles.
///
/// If the queue goes idle while the task is still pending, or the configured
/// tick budget runs out, the task is stalled: nothing left can ever fire its
/// continuation.
pub fn block_on_with(
    task: &TaskHandle,
    events: &EventQueue,
    config: &Config,
) -> Result<Val, Fault> {
    let mut ticks: u64 = 0;

    while !task.is_settled() {
        if config.max_ticks != 0 && ticks >= config.max_ticks {
            return Err(Fault::Stalled {
                task: task.id(),
                reason: format!("tick budget of {} exhausted", config.max_ticks),
            });
        }

        if !events.tick() {
            return Err(Fault::Stalled {
                task: task.id(),
                reason: "event queue is idle".to_string(),
            });
        }

        ticks += 1;
    }

    debug!(task = %task.id(), ticks, "task settled under driver");

    match task.outcome() {
        Some(TaskOutcome::Success(value)) => Ok(value),
        Some(TaskOutcome::Failure(fault)) => Err(Fault::Propagated(fault)),
        None => Err(Fault::invalid_state("block_on", "settled without outcome")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coroutine::{from_fn, Flow, Resume};

    /// Adds up responder inputs across three suspend points.
    fn summing() -> Coroutine<f64, Val, Val> {
        let mut total = 0.0;
        let mut yields = 0;
        Coroutine::new(from_fn(move |input: Resume<f64>| {
            match input {
                Resume::Start => {}
                Resume::Value(v) => total += v,
                Resume::Fault(fault) => return Flow::Throw(fault),
            }
            yields += 1;
            if yields <= 3 {
                Flow::Yield(Val::Num(yields as f64))
            } else {
                Flow::Return(Val::Num(total))
            }
        }))
    }

    #[test]
    fn test_drive_feeds_responses_back() {
        // Responder doubles whatever the coroutine yields
        let mut co = summing();
        let result = drive(&mut co, |yielded| match yielded {
            Val::Num(n) => Ok(n * 2.0),
            other => panic!("unexpected yield {:?}", other),
        })
        .unwrap();

        // 1*2 + 2*2 + 3*2
        assert_eq!(result, Val::Num(12.0));
    }

    #[test]
    fn test_drive_injects_responder_fault() {
        let mut co = summing();
        let err = drive(&mut co, |yielded| match yielded {
            Val::Num(n) if n < 2.0 => Ok(n),
            _ => Err(FaultInfo::new("SinkError", "refused value")),
        })
        .unwrap_err();

        assert_eq!(
            err,
            Fault::Propagated(FaultInfo::new("SinkError", "refused value"))
        );
    }
}
