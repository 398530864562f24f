//! `setTimeout`-backed task scheduler.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use playpen_core::{TaskScheduler, TaskToken};

struct Pending {
    timeout: Timeout,
    fired: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    pending: HashMap<u64, Pending>,
}

/// Schedules tasks with browser timeouts. Cancelling drops the `Timeout`,
/// which clears it.
#[derive(Clone, Default)]
pub struct TimeoutScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeouts that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.inner
            .borrow()
            .pending
            .values()
            .filter(|p| !p.fired.get())
            .count()
    }
}

impl TaskScheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskToken {
        let mut inner = self.inner.borrow_mut();
        // Fired handles are released here rather than from inside their own
        // callback.
        inner.pending.retain(|_, p| !p.fired.get());

        let id = inner.next_id;
        inner.next_id += 1;

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, move || {
            flag.set(true);
            task();
        });
        inner.pending.insert(id, Pending { timeout, fired });
        TaskToken(id)
    }

    fn cancel(&self, token: TaskToken) {
        let mut inner = self.inner.borrow_mut();
        let live = inner
            .pending
            .get(&token.0)
            .is_some_and(|p| !p.fired.get());
        if live {
            if let Some(pending) = inner.pending.remove(&token.0) {
                pending.timeout.cancel();
            }
        }
    }
}
