//! Deterministic event source
//!
//! A virtual clock plus an ordered queue of one-shot events. This is the
//! injected capability behind "register a timer / completion callback":
//! registrars schedule their callbacks here, and tests drive time forward
//! explicitly instead of sleeping. Events fire in (time, insertion) order, so
//! interleavings are fully deterministic. Never a process-wide singleton;
//! construct one per test or per driver.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use crate::errors::FaultInfo;
use crate::scheduler::Registrar;
use crate::values::Val;

struct Scheduled {
    fire_at: DateTime<Utc>,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the BinaryHeap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct QueueInner {
    now: DateTime<Utc>,
    seq: u64,
    events: BinaryHeap<Scheduled>,
}

/// Virtual-time event queue. Cloning shares the queue.
#[derive(Clone)]
pub struct EventQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl EventQueue {
    /// A queue whose clock starts at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(DateTime::UNIX_EPOCH)
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                now,
                seq: 0,
                events: BinaryHeap::new(),
            })),
        }
    }

    /// The current virtual time.
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.borrow().now
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().events.is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.inner.borrow().events.len()
    }

    /// Schedule a one-shot callback at an absolute virtual time.
    pub fn schedule_at(&self, fire_at: DateTime<Utc>, callback: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        inner.seq += 1;
        let seq = inner.seq;
        trace!(seq, %fire_at, "event scheduled");
        inner.events.push(Scheduled {
            fire_at,
            seq,
            callback: Box::new(callback),
        });
    }

    /// Schedule a one-shot callback after a virtual delay.
    pub fn schedule_in(&self, delay: Duration, callback: impl FnOnce() + 'static) {
        let fire_at = self.now() + delay;
        self.schedule_at(fire_at, callback);
    }

    /// Run the earliest pending event, advancing the clock to its fire time.
    /// Returns false if the queue is idle.
    ///
    /// The callback runs after the queue borrow is released, so it may
    /// schedule further events.
    pub fn tick(&self) -> bool {
        let event = {
            let mut inner = self.inner.borrow_mut();
            match inner.events.pop() {
                Some(event) => {
                    if event.fire_at > inner.now {
                        inner.now = event.fire_at;
                    }
                    Some(event)
                }
                None => None,
            }
        };

        match event {
            Some(event) => {
                trace!(seq = event.seq, "event firing");
                (event.callback)();
                true
            }
            None => false,
        }
    }

    /// Run events until the queue is idle. Returns how many fired.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while self.tick() {
            fired += 1;
        }
        fired
    }

    /// A one-shot timer as a registrar: fires the continuation with `Null`
    /// after the delay.
    pub fn timer(&self, delay: Duration) -> Registrar {
        let queue = self.clone();
        Box::new(move |continuation| {
            queue.schedule_in(delay, move || {
                continuation.fire(Val::Null).ok(); // late fire after cancel is benign
            });
        })
    }

    /// A delayed completion as a registrar: fires the continuation with the
    /// given result after the delay. Models any callback-style operation that
    /// eventually reports success or failure.
    pub fn completion(&self, delay: Duration, result: Result<Val, FaultInfo>) -> Registrar {
        let queue = self.clone();
        Box::new(move |continuation| {
            queue.schedule_in(delay, move || {
                match result {
                    Ok(value) => continuation.fire(value),
                    Err(fault) => continuation.fire_fault(fault),
                }
                .ok();
            });
        })
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
