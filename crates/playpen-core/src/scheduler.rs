//! Cancellable delayed tasks and the edit debouncer.
//!
//! `TaskScheduler` is the timer capability (`schedule` returns a token,
//! `cancel` takes it back). `Debouncer` builds the "last edit wins" rule on
//! top of it: every trigger cancels the pending task and schedules a new one,
//! so only the final edit of a burst runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Identifies a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskToken(pub u64);

/// A single-threaded timer facility.
pub trait TaskScheduler {
    /// Run `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskToken;

    /// Cancel a pending task. Cancelling a task that already ran, or was
    /// already cancelled, does nothing.
    fn cancel(&self, token: TaskToken);
}

impl<S: TaskScheduler + ?Sized> TaskScheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskToken {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, token: TaskToken) {
        (**self).cancel(token)
    }
}

/// Coalesces bursts of triggers into a single run after a quiet period.
pub struct Debouncer<S> {
    scheduler: S,
    delay: Duration,
    pending: Rc<Cell<Option<TaskToken>>>,
}

impl<S: TaskScheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Supersede any pending run with `task`.
    pub fn trigger(&self, task: impl FnOnce() + 'static) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
            tracing::trace!(token = token.0, "debounce superseded");
        }

        let pending = self.pending.clone();
        let token = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(token));
    }

    /// Drop the pending run, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

struct ScheduledTask {
    due: Duration,
    token: TaskToken,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

/// A virtual-clock scheduler. Time only moves when [`advance`](Self::advance)
/// is called.
///
/// Used by tests and by hosts without a real event loop. Clones share the
/// same clock and task list.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Move the clock forward, running every task that falls due, in due
    /// order (ties in scheduling order). Tasks may schedule further tasks;
    /// those run too if they fall due within the window.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.borrow().now + by;
        let mut ran = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let idx = inner
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.token))
                    .map(|(i, _)| i);
                idx.map(|i| {
                    let task = inner.tasks.remove(i);
                    inner.now = task.due;
                    task
                })
            };
            match next {
                Some(task) => {
                    (task.task)();
                    ran += 1;
                }
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
        ran
    }
}

impl TaskScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskToken {
        let mut inner = self.inner.borrow_mut();
        let token = TaskToken(inner.next_id);
        inner.next_id += 1;
        let due = inner.now + delay;
        inner.tasks.push(ScheduledTask { due, token, task });
        token
    }

    fn cancel(&self, token: TaskToken) {
        self.inner.borrow_mut().tasks.retain(|t| t.token != token);
    }
}
