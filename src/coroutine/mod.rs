//! The suspend/resume primitive
//!
//! A `Coroutine<I, O, R>` owns a resumable frame and drives it through a
//! strict state machine:
//!
//! 1. `start()` runs the frame to its first suspend point or to termination
//! 2. `next(input)` delivers a value to the pending suspend point
//! 3. `throw(fault)` injects a fault at the pending suspend point
//!
//! Each call advances exactly one suspend point. Completion is signalled
//! in-band by `Step`, so a yielded null is distinguishable from "finished".
//! Once the coroutine reaches a terminal state its frame is dropped and every
//! further operation fails with an `InvalidState` fault.

pub mod frame;
pub mod status;

pub use frame::{from_fn, Flow, FnFrame, Frame, Resume};
pub use status::CoroutineState;

use crate::errors::{Fault, FaultInfo};
use tracing::trace;

/* ===================== Step ===================== */

/// Result of advancing a coroutine by one suspend point.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<O, R> {
    /// The coroutine paused at a suspend point and handed a value out.
    Yielded(O),
    /// The coroutine finished with its final result.
    Complete(R),
}

impl<O, R> Step<O, R> {
    pub fn is_yielded(&self) -> bool {
        matches!(self, Step::Yielded(_))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// The yielded value, discarding a completion result.
    pub fn yielded_value(self) -> Option<O> {
        match self {
            Step::Yielded(v) => Some(v),
            Step::Complete(_) => None,
        }
    }

    /// The completion result, discarding a yielded value.
    pub fn complete_value(self) -> Option<R> {
        match self {
            Step::Yielded(_) => None,
            Step::Complete(r) => Some(r),
        }
    }
}

/* ===================== Coroutine ===================== */

/// A computation that can pause at suspend points and exchange a value with
/// its resumer each time.
///
/// The frame is exclusively owned and never aliased; between suspension and
/// resumption it is quiescent. The terminal value (or fault) is delivered
/// exactly once, to whichever caller performs the final resumption.
pub struct Coroutine<I, O, R> {
    state: CoroutineState,
    frame: Option<Box<dyn Frame<I, O, R>>>,
}

impl<I, O, R> Coroutine<I, O, R> {
    /// Capture a computation's starting point. Nothing runs until `start`.
    pub fn new(frame: impl Frame<I, O, R> + 'static) -> Self {
        Self {
            state: CoroutineState::Created,
            frame: Some(Box::new(frame)),
        }
    }

    pub fn state(&self) -> CoroutineState {
        self.state
    }

    /// Run the computation until its first suspend point or termination.
    ///
    /// Valid only in the Created state; a second `start` is an `InvalidState`
    /// fault.
    pub fn start(&mut self) -> Result<Step<O, R>, Fault> {
        match self.state {
            CoroutineState::Created => self.advance(Resume::Start),
            other => Err(Fault::invalid_state("start", other)),
        }
    }

    /// Deliver `input` as the value of the pending suspend expression and run
    /// to the next suspend point or termination.
    pub fn next(&mut self, input: I) -> Result<Step<O, R>, Fault> {
        match self.state {
            CoroutineState::Suspended => self.advance(Resume::Value(input)),
            other => Err(Fault::invalid_state("next", other)),
        }
    }

    /// Inject `fault` at the pending suspend point, as if the suspend
    /// expression itself raised it.
    ///
    /// The frame may catch the fault and continue (suspending again or
    /// completing normally), or let it propagate, which moves the coroutine
    /// to Failed and rethrows the fault to this caller.
    pub fn throw(&mut self, fault: FaultInfo) -> Result<Step<O, R>, Fault> {
        match self.state {
            CoroutineState::Suspended => self.advance(Resume::Fault(fault)),
            other => Err(Fault::invalid_state("throw", other)),
        }
    }

    fn advance(&mut self, input: Resume<I>) -> Result<Step<O, R>, Fault> {
        let mut frame = self
            .frame
            .take()
            .ok_or_else(|| Fault::invalid_state("resume", self.state))?;

        self.state = CoroutineState::Running;

        match frame.advance(input) {
            Flow::Yield(value) => {
                self.frame = Some(frame);
                self.state = CoroutineState::Suspended;
                trace!(state = %self.state, "coroutine suspended");
                Ok(Step::Yielded(value))
            }
            Flow::Return(result) => {
                // Frame is dropped here; no further resumption is possible.
                self.state = CoroutineState::Completed;
                trace!(state = %self.state, "coroutine completed");
                Ok(Step::Complete(result))
            }
            Flow::Throw(fault) => {
                self.state = CoroutineState::Failed;
                trace!(state = %self.state, code = %fault.code, "coroutine failed");
                Err(Fault::Propagated(fault))
            }
        }
    }
}
