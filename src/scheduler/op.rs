//! Pending-operation descriptors
//!
//! An async coroutine body communicates with the scheduler by yielding
//! `AsyncYield` values. The only real suspend descriptor is `Operation`,
//! carrying a registrar; `Immediate` is the degenerate case of awaiting a
//! plain value, which resumes without any external event.

use std::fmt;

use crate::continuation::Continuation;
use crate::values::Val;

/// A callback-style external operation.
///
/// The registrar performs a side-effecting registration (timer, read,
/// request) and, at an unspecified future time, invokes exactly one of the
/// continuation's fire methods exactly once.
pub type Registrar = Box<dyn FnOnce(Continuation)>;

/// What an async coroutine body hands out at a suspend point.
pub enum AsyncYield {
    /// A pending external operation to wire a fresh continuation to.
    Operation(Registrar),
    /// A plain value; the body is resumed with it immediately.
    Immediate(Val),
}

impl AsyncYield {
    pub fn operation(register: impl FnOnce(Continuation) + 'static) -> Self {
        AsyncYield::Operation(Box::new(register))
    }

    pub fn immediate(value: impl Into<Val>) -> Self {
        AsyncYield::Immediate(value.into())
    }
}

impl fmt::Debug for AsyncYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncYield::Operation(_) => f.write_str("AsyncYield::Operation(..)"),
            AsyncYield::Immediate(value) => write!(f, "AsyncYield::Immediate({:?})", value),
        }
    }
}
