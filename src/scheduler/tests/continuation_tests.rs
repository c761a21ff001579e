//! Tests for the one-shot continuation contract

use super::helpers::*;
use crate::errors::{Fault, FaultInfo};
use crate::scheduler::begin_async;
use crate::types::{TaskOutcome, TaskStatus};
use crate::values::Val;

#[test]
fn test_fire_resumes_with_value() {
    let slot = new_slot();
    let task = begin_async(capture_continuation(slot.clone())).unwrap();
    assert_eq!(task.status(), TaskStatus::Suspended);

    let continuation = take_continuation(&slot);
    continuation.fire(Val::str("payload")).unwrap();

    assert_eq!(
        task.outcome(),
        Some(TaskOutcome::Success(Val::str("payload")))
    );
}

#[test]
fn test_fire_fault_fails_uncatching_body() {
    let slot = new_slot();
    let task = begin_async(capture_continuation(slot.clone())).unwrap();

    let fault = FaultInfo::new("ReadError", "device gone");
    take_continuation(&slot).fire_fault(fault.clone()).unwrap();

    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(task.outcome(), Some(TaskOutcome::Failure(fault)));
}

#[test]
fn test_second_fire_is_double_invocation() {
    let slot = new_slot();
    let task = begin_async(capture_continuation(slot.clone())).unwrap();

    let continuation = take_continuation(&slot);
    continuation.fire(Val::Num(1.0)).unwrap();

    let err = continuation.fire(Val::Num(2.0)).unwrap_err();
    assert!(matches!(err, Fault::DoubleInvocation { .. }));

    // The first resumption stands
    assert_eq!(task.outcome(), Some(TaskOutcome::Success(Val::Num(1.0))));
}

#[test]
fn test_fire_then_fire_fault_is_double_invocation() {
    let slot = new_slot();
    let _task = begin_async(capture_continuation(slot.clone())).unwrap();

    let continuation = take_continuation(&slot);
    continuation.fire(Val::Null).unwrap();

    let err = continuation
        .fire_fault(FaultInfo::new("Late", "too late"))
        .unwrap_err();
    assert!(matches!(err, Fault::DoubleInvocation { .. }));
}

#[test]
fn test_fire_fault_then_fire_is_double_invocation() {
    let slot = new_slot();
    let _task = begin_async(capture_continuation(slot.clone())).unwrap();

    let continuation = take_continuation(&slot);
    continuation
        .fire_fault(FaultInfo::new("First", "one"))
        .unwrap();

    let err = continuation.fire(Val::Null).unwrap_err();
    assert!(matches!(err, Fault::DoubleInvocation { .. }));
}

#[test]
fn test_clones_share_the_one_shot_gate() {
    let slot = new_slot();
    let _task = begin_async(capture_continuation(slot.clone())).unwrap();

    let continuation = take_continuation(&slot);
    let other = continuation.clone();

    continuation.fire(Val::Bool(true)).unwrap();
    let err = other.fire(Val::Bool(false)).unwrap_err();
    assert!(matches!(err, Fault::DoubleInvocation { .. }));
}

#[test]
fn test_fire_on_dropped_task_is_invalid() {
    let slot = new_slot();
    let task = begin_async(capture_continuation(slot.clone())).unwrap();
    let continuation = take_continuation(&slot);

    drop(task);

    let err = continuation.fire(Val::Null).unwrap_err();
    assert!(matches!(err, Fault::InvalidState { .. }));
}

#[test]
fn test_each_suspension_gets_a_fresh_continuation() {
    use crate::coroutine::{from_fn, Flow, Resume};
    use crate::scheduler::AsyncYield;
    use std::cell::RefCell;
    use std::rc::Rc;

    // Body with two suspensions, stashing every continuation it is handed
    let captured: Rc<RefCell<Vec<crate::continuation::Continuation>>> =
        Rc::new(RefCell::new(Vec::new()));
    let mut resumptions = 0u32;
    let stash = captured.clone();

    let task = begin_async(from_fn(move |input: Resume<Val>| {
        resumptions += 1;
        match input {
            Resume::Fault(fault) => Flow::Throw(fault),
            _ if resumptions <= 2 => {
                let stash = stash.clone();
                Flow::Yield(AsyncYield::operation(move |continuation| {
                    stash.borrow_mut().push(continuation);
                }))
            }
            _ => Flow::Return(Val::str("done")),
        }
    }))
    .unwrap();

    let first = captured.borrow()[0].clone();
    first.fire(Val::Null).unwrap();

    // The old continuation is consumed; the new suspension fires through its
    // own fresh one
    assert!(matches!(
        first.fire(Val::Null).unwrap_err(),
        Fault::DoubleInvocation { .. }
    ));

    let second = captured.borrow()[1].clone();
    second.fire(Val::Null).unwrap();
    assert_eq!(task.status(), TaskStatus::Completed);
}
