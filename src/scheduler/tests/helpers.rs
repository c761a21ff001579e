//! Test helpers for scheduler tests
//!
//! Common frame builders. Bodies are closure-based state machines counting
//! their own resumptions; registrars either go through an `EventQueue` or
//! record/stash what they were given.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Duration;

use crate::clock::EventQueue;
use crate::continuation::Continuation;
use crate::coroutine::{from_fn, Flow, Frame, Resume};
use crate::errors::FaultInfo;
use crate::scheduler::AsyncYield;
use crate::values::Val;

pub fn ms(n: i64) -> Duration {
    Duration::milliseconds(n)
}

/// Shared log of registrar invocations, for ordering assertions.
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// One suspension: a delayed completion carrying `value`, then return the
/// resumed value.
pub fn delayed_value(queue: EventQueue, value: &str) -> impl Frame<Val, AsyncYield, Val> {
    let value = Val::str(value);
    from_fn(move |input| match input {
        Resume::Start => Flow::Yield(AsyncYield::Operation(
            queue.completion(ms(10), Ok(value.clone())),
        )),
        Resume::Value(v) => Flow::Return(v),
        Resume::Fault(fault) => Flow::Throw(fault),
    })
}

/// One suspension: a delayed completion that fails with `fault`. The body has
/// no handling, so the fault propagates.
pub fn delayed_failure(queue: EventQueue, fault: FaultInfo) -> impl Frame<Val, AsyncYield, Val> {
    from_fn(move |input| match input {
        Resume::Start => Flow::Yield(AsyncYield::Operation(
            queue.completion(ms(10), Err(fault.clone())),
        )),
        Resume::Value(v) => Flow::Return(v),
        Resume::Fault(fault) => Flow::Throw(fault),
    })
}

/// Two sequential suspensions over the queue; registrations are logged, and
/// the final result joins both resumed strings.
pub fn sequential_fetch(queue: EventQueue, log: Log) -> impl Frame<Val, AsyncYield, Val> {
    let mut resumptions = 0u32;
    let mut first: Option<String> = None;

    from_fn(move |input| {
        resumptions += 1;

        match (resumptions, input) {
            (1, Resume::Start) => {
                let queue2 = queue.clone();
                let log = log.clone();
                Flow::Yield(AsyncYield::operation(move |continuation| {
                    log.borrow_mut().push("register op1".to_string());
                    queue2.schedule_in(ms(10), move || {
                        continuation.fire(Val::str("result1")).ok();
                    });
                }))
            }
            (2, Resume::Value(Val::Str(s))) => {
                first = Some(s);
                let queue2 = queue.clone();
                let log = log.clone();
                Flow::Yield(AsyncYield::operation(move |continuation| {
                    log.borrow_mut().push("register op2".to_string());
                    queue2.schedule_in(ms(10), move || {
                        continuation.fire(Val::str("result2")).ok();
                    });
                }))
            }
            (3, Resume::Value(Val::Str(s))) => {
                let first = first.take().unwrap_or_default();
                Flow::Return(Val::str(format!("{} {}", first, s)))
            }
            (_, Resume::Fault(fault)) => Flow::Throw(fault),
            (_, other) => Flow::Throw(FaultInfo::new(
                "TestBody",
                format!("unexpected resume {:?}", other),
            )),
        }
    })
}

/// Slot for smuggling a continuation out of a registrar.
pub type ContinuationSlot = Rc<RefCell<Option<Continuation>>>;

pub fn new_slot() -> ContinuationSlot {
    Rc::new(RefCell::new(None))
}

pub fn take_continuation(slot: &ContinuationSlot) -> Continuation {
    slot.borrow().clone().expect("registrar not invoked")
}

/// One suspension whose registrar only stashes the continuation; the test
/// decides when and how to fire it.
pub fn capture_continuation(slot: ContinuationSlot) -> impl Frame<Val, AsyncYield, Val> {
    from_fn(move |input| match input {
        Resume::Start => {
            let slot = slot.clone();
            Flow::Yield(AsyncYield::operation(move |continuation| {
                *slot.borrow_mut() = Some(continuation);
            }))
        }
        Resume::Value(v) => Flow::Return(v),
        Resume::Fault(fault) => Flow::Throw(fault),
    })
}

/// Long timer suspension that treats an injected cancellation as a cleanup
/// request instead of propagating it.
pub fn cancellable(queue: EventQueue) -> impl Frame<Val, AsyncYield, Val> {
    from_fn(move |input| match input {
        Resume::Start => Flow::Yield(AsyncYield::Operation(queue.timer(ms(1000)))),
        Resume::Value(_) => Flow::Return(Val::str("timer fired")),
        Resume::Fault(fault) if fault.is_cancellation() => Flow::Return(Val::str("cleaned up")),
        Resume::Fault(fault) => Flow::Throw(fault),
    })
}
