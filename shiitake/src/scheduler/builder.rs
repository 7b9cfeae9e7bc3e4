use super::{Core, Scheduler, Timing};
use crate::{task::Task, UidGenerator};
use hyphae::PriorityQueue;

/// Configures a new [`Scheduler`].
///
/// # Examples
///
/// ```
/// use shiitake::{scheduler::Timing, Scheduler, UidGenerator};
///
/// // two schedulers handing out ids from the same sequence
/// let uids = UidGenerator::new();
/// let a = Scheduler::builder().uid_generator(uids.clone()).build();
/// let b = Scheduler::builder()
///     .uid_generator(uids)
///     .capacity(16)
///     .timing(Timing::WallClock)
///     .build();
/// # drop((a, b));
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Builder {
    capacity: Option<usize>,
    timing: Timing,
    uids: Option<UidGenerator>,
}

impl Builder {
    /// Returns a builder for an unbounded scheduler with [`Timing::Ordered`]
    /// and its own [`UidGenerator`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the run queue to at most `capacity` tasks.
    ///
    /// Adding a task to a full queue fails with
    /// [`Error::QueueFull`](crate::Error::QueueFull). By default, the run
    /// queue is unbounded.
    pub fn capacity(self, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..self
        }
    }

    /// Sets how the scheduler treats task due times. By default,
    /// [`Timing::Ordered`].
    pub fn timing(self, timing: Timing) -> Self {
        Self { timing, ..self }
    }

    /// Draws task ids from `uids`, rather than from a new generator.
    pub fn uid_generator(self, uids: UidGenerator) -> Self {
        Self {
            uids: Some(uids),
            ..self
        }
    }

    /// Returns a new [`Scheduler`] with this configuration and an empty run
    /// queue.
    #[must_use]
    pub fn build(self) -> Scheduler {
        let Self {
            capacity,
            timing,
            uids,
        } = self;
        let is_before: fn(&Task, &Task) -> bool = Task::is_before;
        let queue = match capacity {
            Some(capacity) => PriorityQueue::bounded_with(capacity, is_before),
            None => PriorityQueue::new_with(is_before),
        };

        Scheduler {
            core: Core {
                queue,
                current: None,
                running: false,
                uids: uids.unwrap_or_default(),
                timing,
            },
        }
    }
}
