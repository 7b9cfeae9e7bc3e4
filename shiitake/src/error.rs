use crate::Uid;
use hyphae::Full;

/// Errors returned by a [`Scheduler`](crate::Scheduler).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// [`Scheduler::run`](crate::Scheduler::run) was called on a scheduler
    /// whose run loop is already active.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// A task could not be added, because the run queue is at capacity. The
    /// task was dropped.
    #[error("run queue is full")]
    QueueFull(#[from] Full),

    /// A task that asked to run again could not be put back on the run
    /// queue. The task was dropped and the run loop stopped.
    #[error("task {id} could not be rescheduled")]
    Reschedule {
        /// The id of the dropped task.
        id: Uid,
        /// Why the run queue rejected it.
        #[source]
        source: Full,
    },
}
