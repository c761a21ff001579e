//! Read-only coroutines
//!
//! A generator is a coroutine whose resume input is fixed to unit: it only
//! produces values. `next_value` is the strict iteration operation; the
//! `Iterator` adapter obtained from `into_iter` is the fused ecosystem view.
//!
//! Generators are not restartable. Once the underlying coroutine reaches a
//! terminal state, a new generator must be created to iterate again.

use crate::coroutine::{Coroutine, CoroutineState, Flow, Frame, Resume, Step};
use crate::errors::Fault;
use tracing::trace;

/// A lazy sequence backed by a suspendable computation. Finite or infinite,
/// depending on the frame.
pub struct Generator<O> {
    co: Coroutine<(), O, ()>,
}

impl<O> Generator<O> {
    pub fn new(frame: impl Frame<(), O, ()> + 'static) -> Self {
        Self {
            co: Coroutine::new(frame),
        }
    }

    /// Build a generator from a closure-based state machine.
    pub fn from_fn(f: impl FnMut(Resume<()>) -> Flow<O, ()> + 'static) -> Self {
        Self::new(crate::coroutine::from_fn(f))
    }

    pub fn state(&self) -> CoroutineState {
        self.co.state()
    }

    /// Produce the next value.
    ///
    /// Returns `Ok(Some(value))` per yield and `Ok(None)` exactly once when
    /// the computation finishes; the done signal carries no value. Every call
    /// after that is an `InvalidState` fault, and a fault raised inside the
    /// computation is propagated as-is.
    pub fn next_value(&mut self) -> Result<Option<O>, Fault> {
        let step = match self.co.state() {
            CoroutineState::Created => self.co.start(),
            CoroutineState::Suspended => self.co.next(()),
            other => return Err(Fault::invalid_state("next_value", other)),
        }?;

        match step {
            Step::Yielded(value) => Ok(Some(value)),
            Step::Complete(()) => {
                trace!("generator exhausted");
                Ok(None)
            }
        }
    }
}

impl<O> IntoIterator for Generator<O> {
    type Item = Result<O, Fault>;
    type IntoIter = GeneratorIter<O>;

    fn into_iter(self) -> Self::IntoIter {
        GeneratorIter {
            generator: self,
            finished: false,
        }
    }
}

/// Fused iterator over a generator. Ends at the done signal or at the first
/// propagated fault; never resumes a terminal generator.
pub struct GeneratorIter<O> {
    generator: Generator<O>,
    finished: bool,
}

impl<O> Iterator for GeneratorIter<O> {
    type Item = Result<O, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.generator.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(fault) => {
                self.finished = true;
                Some(Err(fault))
            }
        }
    }
}
