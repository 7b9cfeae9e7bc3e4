//! The task scheduler.
//!
//! A [`Scheduler`] owns a run queue of [`Task`]s ordered by the instant each
//! is next due. [`Scheduler::run`] repeatedly takes the earliest-due task off
//! the queue, invokes its callback, and (if the callback asks for it) puts
//! the task back, due one interval later. The loop ends when the queue is
//! empty or a task calls [`Context::stop`].
//!
//! Scheduling is cooperative and single-threaded: only one callback runs at a
//! time, and it runs to completion before the next one starts. While it runs,
//! a callback may manipulate the scheduler through the [`Context`] it is
//! passed.
//!
//! # Examples
//!
//! ```
//! use shiitake::{Outcome, Scheduler};
//! use std::time::Duration;
//!
//! let mut scheduler = Scheduler::new();
//!
//! let mut ticks = 0;
//! scheduler
//!     .add(Duration::ZERO, move |cx| {
//!         ticks += 1;
//!         if ticks == 3 {
//!             cx.stop();
//!         }
//!         Outcome::Reschedule
//!     })
//!     .unwrap();
//!
//! let stats = scheduler.run().unwrap();
//! assert_eq!(stats.runs, 3);
//! assert!(stats.stopped);
//! ```
use crate::{
    task::{self, Outcome, Task},
    Error, Uid, UidGenerator,
};
use core::fmt;
use hyphae::PriorityQueue;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, trace, warn};

mod builder;

pub use self::builder::Builder;

/// A cooperative interval scheduler.
///
/// See the [module-level documentation](self) for details.
#[derive(Debug)]
pub struct Scheduler {
    core: Core,
}

/// Access to the running [`Scheduler`] from inside a task's callback.
///
/// A `Context` is passed to every callback. It offers the same operations as
/// the scheduler itself (apart from [`Scheduler::run`]), plus
/// [`Context::id`] and [`Context::remove_self`] for the task currently
/// running.
pub struct Context<'a> {
    core: &'a mut Core,
    remove_self: bool,
}

/// Operations shared by [`Scheduler`] and [`Context`], through which a task
/// [`Builder`](task::Builder) adds new tasks.
pub trait Schedule {
    /// Puts `task` on the run queue, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if the run queue is at capacity.
    fn schedule(&mut self, task: Task) -> Result<Uid, Error>;

    /// Returns the generator ids for new tasks are drawn from.
    #[must_use]
    fn uid_generator(&self) -> &UidGenerator;

    /// Returns a new [task `Builder`] for configuring tasks prior to adding
    /// them.
    ///
    /// [task `Builder`]: task::Builder
    #[must_use]
    fn build_task<'a>(&mut self) -> task::Builder<'a, &mut Self>
    where
        Self: Sized,
    {
        task::Builder::new(self)
    }
}

/// How the scheduler treats a task's due time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Timing {
    /// Due times only decide the order in which tasks run. The scheduler
    /// never waits, so a task with a long interval still runs as soon as
    /// every task due before it has run.
    #[default]
    Ordered,
    /// Before running a task, the scheduler sleeps the current thread until
    /// the task is due.
    ///
    /// This is best-effort. A task runs no earlier than it is due, but may
    /// run arbitrarily later if the callbacks before it take a while.
    WallClock,
}

/// The result of [`Scheduler::remove`] and [`Context::remove`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Removal {
    /// The task was on the run queue, and has been dropped.
    Removed,
    /// The task is the one currently running. It will be dropped once its
    /// callback returns, instead of being rescheduled.
    Deferred,
    /// No task with that id is scheduled.
    NotFound,
}

/// Statistics returned by [`Scheduler::run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Stats {
    /// The total number of callbacks invoked.
    pub runs: usize,

    /// The number of runs after which the task was put back on the run queue.
    pub rescheduled: usize,

    /// The number of runs which returned [`Outcome::Complete`].
    pub completed: usize,

    /// The number of runs during which the running task removed itself.
    pub removed: usize,

    /// `true` if the loop ended because a task called [`Context::stop`],
    /// rather than because the run queue was empty.
    pub stopped: bool,
}

#[derive(Debug)]
struct Core {
    queue: PriorityQueue<Task>,
    current: Option<Uid>,
    running: bool,
    uids: UidGenerator,
    timing: Timing,
}

/// What happens to a task after one execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RunResult {
    Reschedule,
    Complete,
    RemovedSelf,
}

// === impl Scheduler ===

impl Scheduler {
    /// Returns a new scheduler with an unbounded run queue, a new
    /// [`UidGenerator`], and [`Timing::Ordered`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a [`Builder`] for configuring a new scheduler.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Adds a task which runs `callback` every `interval`, returning its id.
    ///
    /// The task is first due one `interval` from now. Use
    /// [`Scheduler::build_task`] to configure a name or a different first
    /// delay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if the run queue is at capacity. The task
    /// is dropped, and the scheduler is unchanged.
    pub fn add<F>(&mut self, interval: Duration, callback: F) -> Result<Uid, Error>
    where
        F: FnMut(&mut Context<'_>) -> Outcome + Send + 'static,
    {
        self.build_task().interval(interval).spawn(callback)
    }

    /// Returns a new [task `Builder`] for configuring tasks prior to adding
    /// them to this scheduler.
    ///
    /// [task `Builder`]: task::Builder
    #[must_use]
    pub fn build_task<'a>(&mut self) -> task::Builder<'a, &mut Self> {
        task::Builder::new(self)
    }

    /// Removes the task identified by `id` from the run queue, dropping it.
    ///
    /// Returns [`Removal::Removed`] if the task was found, or
    /// [`Removal::NotFound`] otherwise. Use [`Context::remove`] to remove
    /// tasks while the scheduler is running.
    pub fn remove(&mut self, id: Uid) -> Removal {
        self.core.remove(id)
    }

    /// Returns `true` if no tasks are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns the number of tasks on the run queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.queue.len()
    }

    /// Returns `true` if a task identified by `id` is on the run queue.
    #[must_use]
    pub fn contains(&self, id: Uid) -> bool {
        self.core.contains(id)
    }

    /// Drops every task on the run queue.
    pub fn clear(&mut self) {
        self.core.clear()
    }

    /// Clears the scheduler's running flag.
    ///
    /// A run loop interrupted by a panicking callback leaves the flag set,
    /// so that [`Scheduler::run`] refuses to start again; calling `stop`
    /// allows it to.
    pub fn stop(&mut self) {
        self.core.stop()
    }

    /// Returns the generator this scheduler draws task ids from.
    #[must_use]
    pub fn uid_generator(&self) -> &UidGenerator {
        &self.core.uids
    }

    /// Runs scheduled tasks until the run queue is empty or a task calls
    /// [`Context::stop`].
    ///
    /// Each iteration takes the earliest-due task off the run queue and
    /// invokes its callback. If the callback returns [`Outcome::Reschedule`]
    /// (and did not remove its own task), the task is put back on the queue,
    /// due one interval later. Otherwise, it is dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if the scheduler's running flag is already
    ///   set. Nothing is changed.
    /// - [`Error::Reschedule`] if a task could not be put back on the run
    ///   queue because tasks added by callbacks filled it up. That task is
    ///   dropped and the loop stops. The other tasks stay queued.
    pub fn run(&mut self) -> Result<Stats, Error> {
        let core = &mut self.core;
        if core.running {
            return Err(Error::AlreadyRunning);
        }
        core.running = true;
        core.current = None;

        let mut stats = Stats::default();
        debug!(timing = ?core.timing, "scheduler starting");

        while core.running {
            let Some(mut task) = core.queue.dequeue() else {
                break;
            };

            if core.timing == Timing::WallClock {
                let wait = task.next_due().saturating_duration_since(Instant::now());
                if !wait.is_zero() {
                    trace!(task.id = %task.id(), ?wait, "waiting for task");
                    std::thread::sleep(wait);
                }
            }

            let result = core.run_task(&mut task);
            stats.runs += 1;

            match result {
                RunResult::Reschedule => {
                    task.update();
                    if let Err(full) = core.queue.enqueue(task) {
                        let id = full.value().id();
                        let source = full.forget();
                        core.running = false;
                        warn!(task.id = %id, capacity = source.capacity(), "could not reschedule task");
                        return Err(Error::Reschedule { id, source });
                    }
                    stats.rescheduled += 1;
                }
                RunResult::Complete => stats.completed += 1,
                RunResult::RemovedSelf => stats.removed += 1,
            }

            debug!(?result, stats.runs, stats.rescheduled);
        }

        stats.stopped = !core.running;
        core.running = false;

        debug!(
            stats.runs,
            stats.rescheduled,
            stats.completed,
            stats.removed,
            stats.stopped,
            "scheduler finished"
        );

        Ok(stats)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule for Scheduler {
    fn schedule(&mut self, task: Task) -> Result<Uid, Error> {
        self.core.schedule(task)
    }

    fn uid_generator(&self) -> &UidGenerator {
        &self.core.uids
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let mut dropped = 0usize;
        while self.core.queue.dequeue().is_some() {
            dropped += 1;
        }
        trace!(dropped, "drop scheduler");
    }
}

// === impl Context ===

impl Context<'_> {
    /// Returns the id of the task whose callback is running.
    #[must_use]
    pub fn id(&self) -> Uid {
        self.core.current.unwrap_or(Uid::INVALID)
    }

    /// Adds a task which runs `callback` every `interval`, returning its id.
    ///
    /// See [`Scheduler::add`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if the run queue is at capacity.
    pub fn add<F>(&mut self, interval: Duration, callback: F) -> Result<Uid, Error>
    where
        F: FnMut(&mut Context<'_>) -> Outcome + Send + 'static,
    {
        self.build_task().interval(interval).spawn(callback)
    }

    /// Returns a new [task `Builder`] for configuring tasks prior to adding
    /// them to the running scheduler.
    ///
    /// [task `Builder`]: task::Builder
    #[must_use]
    pub fn build_task<'b>(&mut self) -> task::Builder<'b, &mut Self> {
        task::Builder::new(self)
    }

    /// Removes the task identified by `id`.
    ///
    /// If `id` is the running task, it is dropped once the callback returns
    /// and [`Removal::Deferred`] is returned. Otherwise this behaves like
    /// [`Scheduler::remove`].
    pub fn remove(&mut self, id: Uid) -> Removal {
        if self.core.current == Some(id) {
            debug!(task.id = %id, "removal deferred until callback returns");
            self.remove_self = true;
            return Removal::Deferred;
        }

        self.core.remove(id)
    }

    /// Drops the running task once its callback returns, regardless of the
    /// [`Outcome`] it returns.
    pub fn remove_self(&mut self) {
        let id = self.id();
        let _ = self.remove(id);
    }

    /// Stops the run loop once the running callback returns.
    ///
    /// Tasks still on the run queue stay there, and will run if
    /// [`Scheduler::run`] is called again.
    pub fn stop(&mut self) {
        self.core.stop()
    }

    /// Drops every task on the run queue. The running task is unaffected.
    pub fn clear(&mut self) {
        self.core.clear()
    }

    /// Returns `true` if no tasks are scheduled.
    ///
    /// The running task counts as scheduled, so this is always `false` while
    /// a callback runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    /// Returns the number of tasks on the run queue, not counting the running
    /// task.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.queue.len()
    }

    /// Returns `true` if a task identified by `id` is on the run queue.
    #[must_use]
    pub fn contains(&self, id: Uid) -> bool {
        self.core.contains(id)
    }
}

impl Schedule for Context<'_> {
    fn schedule(&mut self, task: Task) -> Result<Uid, Error> {
        self.core.schedule(task)
    }

    fn uid_generator(&self) -> &UidGenerator {
        &self.core.uids
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { core, remove_self } = self;
        f.debug_struct("Context")
            .field("current", &core.current)
            .field("remove_self", remove_self)
            .field("queued", &core.queue.len())
            .finish()
    }
}

impl<S: Schedule + ?Sized> Schedule for &mut S {
    #[inline]
    fn schedule(&mut self, task: Task) -> Result<Uid, Error> {
        (**self).schedule(task)
    }

    #[inline]
    fn uid_generator(&self) -> &UidGenerator {
        (**self).uid_generator()
    }
}

// === impl Core ===

impl Core {
    fn schedule(&mut self, task: Task) -> Result<Uid, Error> {
        let id = task.id();
        match self.queue.enqueue(task) {
            Ok(()) => {
                debug!(task.id = %id, "task scheduled");
                Ok(id)
            }
            Err(full) => {
                debug!(task.id = %id, capacity = full.capacity(), "run queue full");
                Err(Error::QueueFull(full.forget()))
            }
        }
    }

    fn remove(&mut self, id: Uid) -> Removal {
        match self.queue.remove(|task| task.is_match(id)) {
            Some(task) => {
                debug!(task.id = %id, "task removed");
                drop(task);
                Removal::Removed
            }
            None => {
                trace!(task.id = %id, "task to remove not found");
                Removal::NotFound
            }
        }
    }

    fn contains(&self, id: Uid) -> bool {
        self.queue.contains(|task| task.is_match(id))
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.current.is_none()
    }

    fn clear(&mut self) {
        debug!("clearing run queue");
        self.queue.clear();
    }

    fn stop(&mut self) {
        if self.running {
            debug!("scheduler stopping");
        }
        self.running = false;
    }

    /// Runs one task's callback, with `task` as the current task.
    fn run_task(&mut self, task: &mut Task) -> RunResult {
        let _span = debug_span!("run", task.id = %task.id(), task.name = task.name()).entered();

        self.current = Some(task.id());
        let mut cx = Context {
            core: self,
            remove_self: false,
        };
        let outcome = task.run(&mut cx);
        let removed = cx.remove_self;
        self.current = None;

        match (outcome, removed) {
            (_, true) => RunResult::RemovedSelf,
            (Outcome::Reschedule, false) => RunResult::Reschedule,
            (Outcome::Complete, false) => RunResult::Complete,
        }
    }
}
