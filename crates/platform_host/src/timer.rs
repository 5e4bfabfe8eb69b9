//! Timer contract used for per-step animation delays and debounced reflow.

use std::{cell::RefCell, rc::Rc};

/// Handle returned by [`TimerHost::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// One-shot timer callback.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Host service for one-shot timers on the UI thread.
pub trait TimerHost {
    /// Schedules `callback` after `delay_ms`. Returns `None` when the host could not schedule it.
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Option<TimerId>;

    /// Cancels a pending timer. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

/// Timer host that never fires; used where no event loop exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTimerHost;

impl TimerHost for NoopTimerHost {
    fn set_timeout(&self, _delay_ms: u32, _callback: TimerCallback) -> Option<TimerId> {
        None
    }

    fn clear_timeout(&self, _id: TimerId) {}
}

struct PendingTimer {
    due_ms: u64,
    id: TimerId,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualState {
    now_ms: u64,
    next_id: i32,
    pending: Vec<PendingTimer>,
}

/// Deterministic timer host driven by explicit [`ManualTimerHost::advance`] calls.
///
/// Clones share one clock and queue.
#[derive(Clone, Default)]
pub struct ManualTimerHost {
    inner: Rc<RefCell<ManualState>>,
}

impl ManualTimerHost {
    /// Host at time `0` with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current manual clock.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Timers scheduled and not yet fired or cleared.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Advances the clock by `ms`, firing due timers in due-time then scheduling order.
    /// Timers scheduled by callbacks fire in the same call if they fall inside the window.
    pub fn advance(&self, ms: u64) {
        let target = self.inner.borrow().now_ms.saturating_add(ms);
        while let Some(callback) = self.pop_due(target) {
            callback();
        }
        self.inner.borrow_mut().now_ms = target;
    }

    /// Fires timers until the queue is empty. Returns how many fired.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(callback) = self.pop_due(u64::MAX) {
            callback();
            fired += 1;
            if fired > 100_000 {
                break;
            }
        }
        fired
    }

    fn pop_due(&self, limit: u64) -> Option<TimerCallback> {
        let mut state = self.inner.borrow_mut();
        let index = state
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= limit)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.id.0))
            .map(|(index, _)| index)?;
        let timer = state.pending.remove(index);
        state.now_ms = state.now_ms.max(timer.due_ms);
        Some(timer.callback)
    }
}

impl TimerHost for ManualTimerHost {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Option<TimerId> {
        let mut state = self.inner.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let due_ms = state.now_ms + u64::from(delay_ms);
        state.pending.push(PendingTimer {
            due_ms,
            id,
            callback,
        });
        Some(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.inner
            .borrow_mut()
            .pending
            .retain(|timer| timer.id != id);
    }
}
