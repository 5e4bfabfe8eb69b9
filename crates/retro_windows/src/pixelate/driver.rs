//! Binds a [`PixelationSession`] to a drawing surface and a timer host.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use platform_host::{PixelSurface, TimerHost, TimerId};
use tracing::trace;

use super::frame::{plan_frame, StepDelays};
use super::session::{PixelationSession, PixelationState, PixelationStep};
use crate::config::PixelateConfig;
use crate::error::EngineError;
use crate::scatter::ScatterRng;

struct DriverState<S> {
    session: PixelationSession,
    surface: S,
    config: PixelateConfig,
    delays: StepDelays,
    rng: ScatterRng,
    pending: Option<TimerId>,
    draws: u32,
}

impl<S: PixelSurface> DriverState<S> {
    fn draw(&mut self, exponent: u32) {
        self.draws += 1;
        let (Some(rendered), Some(natural)) =
            (self.surface.rendered_size(), self.surface.natural_size())
        else {
            trace!(exponent, "pixelation frame skipped: image not measurable");
            return;
        };
        let frame = plan_frame(exponent, rendered, natural, self.surface.object_fit());
        if let Err(err) = self.surface.draw(&frame).map_err(EngineError::Draw) {
            trace!(exponent, %err, "pixelation frame failed; continuing");
        }
    }
}

/// Drives one image's reveal.
///
/// Timer callbacks hold only a weak reference to the driver state, so dropping the driver (or
/// calling [`PixelationDriver::teardown`]) leaves nothing that can touch a removed canvas.
pub struct PixelationDriver<S> {
    inner: Rc<RefCell<DriverState<S>>>,
    timers: Rc<dyn TimerHost>,
}

impl<S: PixelSurface + 'static> PixelationDriver<S> {
    /// Idle driver; `seed` feeds the per-step delay jitter.
    pub fn new(surface: S, config: PixelateConfig, timers: Rc<dyn TimerHost>, seed: u32) -> Self {
        let delays = StepDelays::from_config(&config);
        let session = PixelationSession::new(config.steps);
        Self {
            inner: Rc::new(RefCell::new(DriverState {
                session,
                surface,
                config,
                delays,
                rng: ScatterRng::new(seed),
                pending: None,
                draws: 0,
            })),
            timers,
        }
    }

    /// Current session state.
    pub fn state(&self) -> PixelationState {
        self.inner.borrow().session.state()
    }

    /// Frames drawn so far, including failed attempts.
    pub fn draw_count(&self) -> u32 {
        self.inner.borrow().draws
    }

    /// Image decoded. Prepares the overlay, or skips when the image opted out, the effect is
    /// disabled, or the host prefers reduced motion.
    pub fn on_loaded(&self, opted_out: bool, reduced_motion: bool) {
        let mut state = self.inner.borrow_mut();
        let has_pixels = state
            .surface
            .natural_size()
            .is_some_and(|natural| !natural.is_empty());
        if !has_pixels && !opted_out {
            return;
        }
        let skip = opted_out
            || !state.config.enabled
            || (reduced_motion && state.config.respect_reduced_motion);
        if let Some(exponent) = state.session.prepare(skip) {
            state.surface.show_overlay();
            state.draw(exponent);
        }
    }

    /// Container entered the viewport. Only the first call after preparing has any effect.
    pub fn on_visible(&self) {
        let settle = {
            let mut state = self.inner.borrow_mut();
            if !state.session.start() {
                return;
            }
            state.config.settle_delay_ms
        };
        schedule(&self.inner, &self.timers, settle);
    }

    /// Container resized. Redraws the prepared frame at the new size.
    pub fn on_resize(&self) {
        let mut state = self.inner.borrow_mut();
        if let Some(exponent) = state.session.redraw_exponent() {
            state.surface.show_overlay();
            state.draw(exponent);
        }
    }

    /// Cancels any pending step and reveals the image if an overlay is showing.
    pub fn teardown(&self) {
        let mut state = self.inner.borrow_mut();
        if let Some(id) = state.pending.take() {
            self.timers.clear_timeout(id);
        }
        if state.session.abort() {
            state.surface.reveal();
        }
    }
}

fn schedule<S: PixelSurface + 'static>(
    inner: &Rc<RefCell<DriverState<S>>>,
    timers: &Rc<dyn TimerHost>,
    delay_ms: u32,
) {
    let weak: Weak<RefCell<DriverState<S>>> = Rc::downgrade(inner);
    let callback_timers = Rc::clone(timers);
    let id = timers.set_timeout(
        delay_ms,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                tick(&inner, &callback_timers);
            }
        }),
    );
    match id {
        Some(id) => inner.borrow_mut().pending = Some(id),
        None => finish_now(inner),
    }
}

fn tick<S: PixelSurface + 'static>(inner: &Rc<RefCell<DriverState<S>>>, timers: &Rc<dyn TimerHost>) {
    let next_delay = {
        let mut state = inner.borrow_mut();
        state.pending = None;
        match state.session.advance() {
            Some(PixelationStep::Draw(exponent)) => {
                state.draw(exponent);
                let delays = state.delays;
                Some(delays.pick(&mut state.rng))
            }
            Some(PixelationStep::Finish) => {
                state.surface.reveal();
                None
            }
            None => None,
        }
    };
    if let Some(delay) = next_delay {
        schedule(inner, timers, delay);
    }
}

/// Runs the remaining steps synchronously when the host cannot schedule timers.
fn finish_now<S: PixelSurface>(inner: &Rc<RefCell<DriverState<S>>>) {
    let mut state = inner.borrow_mut();
    while let Some(step) = state.session.advance() {
        match step {
            PixelationStep::Draw(exponent) => state.draw(exponent),
            PixelationStep::Finish => state.surface.reveal(),
        }
    }
}
