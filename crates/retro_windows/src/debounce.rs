//! Trailing-edge debouncer over a [`TimerHost`].

use std::{cell::Cell, rc::Rc};

use platform_host::{TimerHost, TimerId};

/// Coalesces bursts of calls into one run after a quiet period.
///
/// Each [`Debouncer::call`] cancels the pending run and schedules a new one.
pub struct Debouncer {
    timers: Rc<dyn TimerHost>,
    delay_ms: u32,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl Debouncer {
    /// Debouncer that waits `delay_ms` of quiet before running.
    pub fn new(timers: Rc<dyn TimerHost>, delay_ms: u32) -> Self {
        Self {
            timers,
            delay_ms,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Replaces any pending run with `run`, scheduled after the quiet period.
    pub fn call(&self, run: impl FnOnce() + 'static) {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let id = self.timers.set_timeout(
            self.delay_ms,
            Box::new(move || {
                pending.set(None);
                run();
            }),
        );
        self.pending.set(id);
    }

    /// Drops the pending run, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            self.timers.clear_timeout(id);
        }
    }

    /// Whether a run is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use platform_host::ManualTimerHost;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bursts_collapse_into_one_trailing_run() {
        let host = ManualTimerHost::new();
        let debouncer = Debouncer::new(Rc::new(host.clone()), 150);
        let runs = Rc::new(Cell::new(0));

        for _ in 0..5 {
            let runs = Rc::clone(&runs);
            debouncer.call(move || runs.set(runs.get() + 1));
            host.advance(100);
        }
        assert_eq!(runs.get(), 0);
        assert!(debouncer.is_pending());

        host.advance(50);
        assert_eq!(runs.get(), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(host.pending_count(), 0);
    }

    #[test]
    fn dropping_the_debouncer_cancels_the_pending_run() {
        let host = ManualTimerHost::new();
        let runs = Rc::new(Cell::new(0));
        {
            let debouncer = Debouncer::new(Rc::new(host.clone()), 150);
            let runs = Rc::clone(&runs);
            debouncer.call(move || runs.set(runs.get() + 1));
        }
        host.run_until_idle();
        assert_eq!(runs.get(), 0);
    }
}
