//! Scheduled tasks.
//!
//! A [`Task`] pairs a callback with the [`Uid`] that identifies it and the
//! interval at which it asks to run. Tasks are created through a task
//! [`Builder`] (returned by [`Scheduler::build_task`] and
//! [`Context::build_task`]) or the [`Scheduler::add`] shorthand, and are owned
//! by the scheduler from then on.
//!
//! [`Scheduler::build_task`]: crate::Scheduler::build_task
//! [`Scheduler::add`]: crate::Scheduler::add
use crate::{scheduler::Context, Uid};
use core::fmt;
use std::time::{Duration, Instant};

mod builder;

pub use self::builder::Builder;
pub(crate) use self::builder::Settings;

/// A task's callback.
///
/// The callback receives a [`Context`] through which it may add, remove or
/// look up tasks on the scheduler that is running it, and returns an
/// [`Outcome`] saying whether it wants to run again.
pub type Callback = Box<dyn FnMut(&mut Context<'_>) -> Outcome + Send>;

/// What a task wants to happen after its callback returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Run the task again, one interval from now.
    Reschedule,
    /// The task is done, and will be dropped.
    Complete,
}

/// A task owned by a [`Scheduler`](crate::Scheduler).
pub struct Task {
    id: Uid,
    name: Option<String>,
    interval: Duration,
    next_due: Instant,
    callback: Callback,
}

impl Task {
    /// Returns a new task, first due after the configured delay (or one
    /// interval from now, if no delay was configured).
    pub(crate) fn new(id: Uid, settings: &Settings<'_>, callback: Callback) -> Self {
        let delay = settings.delay.unwrap_or(settings.interval);
        Self {
            id,
            name: settings.name.map(String::from),
            interval: settings.interval,
            next_due: Instant::now() + delay,
            callback,
        }
    }

    /// Invokes the task's callback.
    pub(crate) fn run(&mut self, cx: &mut Context<'_>) -> Outcome {
        (self.callback)(cx)
    }

    /// Moves the task's due time to one interval from now.
    pub(crate) fn update(&mut self) {
        self.next_due = Instant::now() + self.interval;
    }

    /// Returns `true` if `a` is due strictly before `b`.
    ///
    /// This is the ordering of the scheduler's run queue. Tasks due at the
    /// same instant run in the order they were queued.
    #[must_use]
    pub fn is_before(a: &Task, b: &Task) -> bool {
        a.next_due < b.next_due
    }

    /// Returns `true` if this task is identified by `id`.
    #[must_use]
    #[inline]
    pub fn is_match(&self, id: Uid) -> bool {
        self.id == id
    }

    /// Returns this task's id.
    #[must_use]
    #[inline]
    pub fn id(&self) -> Uid {
        self.id
    }

    /// Returns the name the task was built with, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns how long the task waits between runs.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the instant at which the task is next due to run.
    #[must_use]
    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            id,
            name,
            interval,
            next_due,
            callback: _,
        } = self;
        f.debug_struct("Task")
            .field("id", id)
            .field("name", name)
            .field("interval", interval)
            .field("next_due", next_due)
            .finish_non_exhaustive()
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        tracing::trace!(task.id = %self.id, task.name = self.name(), "drop task");
    }
}
