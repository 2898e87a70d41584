//! Deferred-callback schedulers that drive an animation run.
//!
//! The engine never sleeps. Each step schedules the next one through a
//! [`Scheduler`] and returns. [`LocalScheduler`] runs steps on a tokio
//! `LocalSet`; [`VirtualClock`] runs them against a simulated clock so timing
//! can be tested without waiting.

use std::cell::{Cell, RefCell};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

/// A deferred callback.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Identifies a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

/// Runs callbacks after a delay.
///
/// Delays are pacing hints, not deadlines: an implementation may run a task
/// late, but tasks scheduled with non-decreasing due times run in the order
/// they were scheduled.
pub trait Scheduler {
    fn after(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Schedules tasks on the current tokio `LocalSet`.
///
/// # Panics
///
/// [`after`](Scheduler::after) panics if called outside a `LocalSet`, like
/// [`tokio::task::spawn_local`].
#[derive(Debug, Default)]
pub struct LocalScheduler {
    next_id: Cell<u64>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for LocalScheduler {
    fn after(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        trace!(task = handle.0, ?delay, "scheduling task");
        tokio::task::spawn_local(async move {
            sleep(delay).await;
            task();
        });
        handle
    }
}

struct Pending {
    due: Duration,
    handle: TaskHandle,
    task: Task,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.handle).cmp(&(other.due, other.handle))
    }
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Reverse<Pending>>,
}

/// A simulated clock. Tasks run only when the clock is advanced.
///
/// Time starts at zero. Ties between tasks due at the same instant are broken
/// by scheduling order.
#[derive(Default)]
pub struct VirtualClock {
    state: RefCell<ClockState>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time since the clock was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Total number of tasks ever scheduled.
    pub fn scheduled(&self) -> u64 {
        self.state.borrow().next_id
    }

    /// Move time forward by `by`, running every task that falls due, in order.
    ///
    /// Tasks scheduled by running tasks are run too if they fall due within the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(Some(target)) {
            task();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Run tasks until none are left, jumping time to each one's due instant.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(None) {
            task();
            ran += 1;
        }
        ran
    }

    /// Run the next due task, if any. Returns whether one ran.
    pub fn run_next(&self) -> bool {
        match self.pop_due(None) {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    // The borrow is released before the task runs so it can schedule more work.
    fn pop_due(&self, limit: Option<Duration>) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let due = state.queue.peek()?.0.due;
        if limit.is_some_and(|limit| due > limit) {
            return None;
        }
        let Reverse(pending) = state.queue.pop()?;
        state.now = state.now.max(pending.due);
        Some(pending.task)
    }
}

impl Scheduler for VirtualClock {
    fn after(&self, delay: Duration, task: Task) -> TaskHandle {
        let mut state = self.state.borrow_mut();
        let handle = TaskHandle(state.next_id);
        state.next_id += 1;
        let due = state.now + delay;
        trace!(task = handle.0, ?due, "scheduling virtual task");
        state.queue.push(Reverse(Pending { due, handle, task }));
        handle
    }
}
