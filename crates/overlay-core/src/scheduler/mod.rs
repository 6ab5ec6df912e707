//! Debounced, idle-deferred recompute scheduling.
//!
//! The primitives take the current time as an argument instead of reading a
//! clock, so the host loop decides what "now" is. [`driver`] runs them on a
//! tokio runtime.

pub mod driver;

use std::time::{Duration, Instant};

/// Trailing-edge debounce: fires once `delay` has passed since the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an event. Pushes the deadline out to `now + delay`.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// `true` exactly once per quiet interval, on the first call at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Work waiting for the host loop's next idle point.
///
/// Equal entries coalesce, so queuing the same job twice runs it once.
#[derive(Debug)]
pub struct IdleQueue<T> {
    pending: Vec<T>,
}

impl<T> Default for IdleQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: PartialEq> IdleQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if an equal entry was already queued.
    pub fn push(&mut self, job: T) -> bool {
        if self.pending.contains(&job) {
            return false;
        }
        self.pending.push(job);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take everything queued, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }
}

/// A full recompute of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recompute;

/// Debouncer feeding an idle queue.
///
/// Events arm the debouncer, an expired debouncer queues a [`Recompute`] and
/// the host runs it at its next idle point.
#[derive(Debug)]
pub struct RecomputeScheduler {
    debouncer: Debouncer,
    idle: IdleQueue<Recompute>,
}

impl RecomputeScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            idle: IdleQueue::new(),
        }
    }

    pub fn notify(&mut self, now: Instant) {
        self.debouncer.trigger(now);
    }

    /// Move an expired debounce onto the idle queue. Returns whether a pass is queued.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debouncer.fire(now) {
            self.idle.push(Recompute);
        }
        !self.idle.is_empty()
    }

    /// Called at an idle point. Returns `true` if a pass should run now.
    pub fn take_idle(&mut self) -> bool {
        !self.idle.drain().is_empty()
    }

    /// Queue a pending debounce without waiting for it to expire.
    pub fn flush(&mut self) -> bool {
        if self.debouncer.cancel() {
            self.idle.push(Recompute);
        }
        !self.idle.is_empty()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_until_fire(now)
    }

    pub fn is_idle(&self) -> bool {
        !self.debouncer.is_pending() && self.idle.is_empty()
    }
}
