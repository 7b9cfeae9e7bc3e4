use super::{Context, Outcome, Task};
use crate::{scheduler::Schedule, Error, Uid};
use std::time::Duration;

/// Builds a new [`Task`] prior to adding it to a scheduler.
///
/// A `Builder` is returned by [`Scheduler::build_task`] and
/// [`Context::build_task`].
///
/// [`Scheduler::build_task`]: crate::Scheduler::build_task
#[derive(Debug)]
pub struct Builder<'a, S> {
    scheduler: S,
    settings: Settings<'a>,
}

/// Configures settings for new tasks.
#[derive(Debug, Clone)]
pub(crate) struct Settings<'a> {
    pub(super) name: Option<&'a str>,
    pub(super) interval: Duration,
    pub(super) delay: Option<Duration>,
}

impl<'a, S: Schedule> Builder<'a, S> {
    pub(crate) const fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            settings: Settings::new(),
        }
    }

    /// Adds a name to the tasks produced by this builder.
    ///
    /// This sets the `task.name` field of the `tracing` spans recorded while
    /// the task runs. By default, tasks are unnamed.
    pub fn name(self, name: &'a str) -> Self {
        Self {
            settings: Settings {
                name: Some(name),
                ..self.settings
            },
            ..self
        }
    }

    /// Sets the interval after which the task is due again each time it asks
    /// to be rescheduled.
    ///
    /// By default, the interval is zero.
    pub fn interval(self, interval: Duration) -> Self {
        Self {
            settings: Settings {
                interval,
                ..self.settings
            },
            ..self
        }
    }

    /// Overrides how long after being added the task is first due.
    ///
    /// By default, a new task is first due one interval after it is added.
    pub fn delay(self, delay: Duration) -> Self {
        Self {
            settings: Settings {
                delay: Some(delay),
                ..self.settings
            },
            ..self
        }
    }

    /// Adds a task running `callback` to the scheduler, with this builder's
    /// configured settings, returning the new task's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if the scheduler's run queue is at
    /// capacity. The task is dropped, and the scheduler is unchanged.
    pub fn spawn<F>(self, callback: F) -> Result<Uid, Error>
    where
        F: FnMut(&mut Context<'_>) -> Outcome + Send + 'static,
    {
        let Self {
            mut scheduler,
            settings,
        } = self;
        let id = scheduler.uid_generator().next();
        scheduler.schedule(Task::new(id, &settings, Box::new(callback)))
    }
}

// === impl Settings ===

impl Settings<'_> {
    pub(crate) const fn new() -> Self {
        Self {
            name: None,
            interval: Duration::ZERO,
            delay: None,
        }
    }
}
