//! Per-image pixelation state machine.

use serde::Serialize;

/// Where one image's reveal stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelationState {
    /// Waiting for the image to decode.
    Idle,
    /// Most-pixelated frame drawn, image hidden, waiting for viewport entry.
    Prepared,
    /// Opted out, disabled or reduced motion; no overlay was ever drawn.
    Skipped,
    /// Counting down towards the sharp frame.
    Animating {
        /// Frames drawn since the prepared one.
        step: u32,
    },
    /// Overlay removed and the image shown, or the session was aborted.
    Finished,
}

/// Work produced by one animation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelationStep {
    /// Draw the frame with this exponent.
    Draw(u32),
    /// Remove the overlay and reveal the image.
    Finish,
}

/// Per-image state machine: `idle -> prepared -> (skipped | animating -> finished)`.
///
/// The prepared frame draws exponent `steps`; ticks then yield `steps - 1` down to `0` and a final
/// [`PixelationStep::Finish`], so a full run makes exactly `steps + 1` draws with strictly
/// decreasing exponents. Every transition happens at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelationSession {
    steps: u32,
    state: PixelationState,
}

impl PixelationSession {
    /// Idle session whose most pixelated frame is `2^steps`.
    pub fn new(steps: u32) -> Self {
        Self {
            steps,
            state: PixelationState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> PixelationState {
        self.state
    }

    /// Exponent of the prepared frame.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Leaves `Idle`. Returns the exponent of the prepared frame, or `None` when skipped or
    /// already past `Idle`.
    pub fn prepare(&mut self, skip: bool) -> Option<u32> {
        if self.state != PixelationState::Idle {
            return None;
        }
        if skip {
            self.state = PixelationState::Skipped;
            return None;
        }
        self.state = PixelationState::Prepared;
        Some(self.steps)
    }

    /// Viewport entry. Returns `true` only on the single `Prepared -> Animating` transition.
    pub fn start(&mut self) -> bool {
        if self.state != PixelationState::Prepared {
            return false;
        }
        self.state = PixelationState::Animating { step: 0 };
        true
    }

    /// One animation tick. `None` outside `Animating`.
    pub fn advance(&mut self) -> Option<PixelationStep> {
        let PixelationState::Animating { step } = self.state else {
            return None;
        };
        if step >= self.steps {
            self.state = PixelationState::Finished;
            return Some(PixelationStep::Finish);
        }
        let next = step + 1;
        self.state = PixelationState::Animating { step: next };
        Some(PixelationStep::Draw(self.steps - next))
    }

    /// Exponent to redraw after a resize; only while prepared.
    pub fn redraw_exponent(&self) -> Option<u32> {
        (self.state == PixelationState::Prepared).then_some(self.steps)
    }

    /// Ends the session early. Returns `true` if an overlay was showing and must be removed.
    pub fn abort(&mut self) -> bool {
        let showing = matches!(
            self.state,
            PixelationState::Prepared | PixelationState::Animating { .. }
        );
        if showing {
            self.state = PixelationState::Finished;
        }
        showing
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn full_run_draws_steps_plus_one_frames_in_decreasing_order() {
        let mut session = PixelationSession::new(4);
        let mut exponents = vec![session.prepare(false).expect("prepared")];
        assert!(session.start());
        assert!(!session.start());

        while let Some(step) = session.advance() {
            match step {
                PixelationStep::Draw(exponent) => exponents.push(exponent),
                PixelationStep::Finish => break,
            }
        }

        assert_eq!(exponents, vec![4, 3, 2, 1, 0]);
        assert_eq!(session.state(), PixelationState::Finished);
        assert!(!session.start());
        assert_eq!(session.advance(), None);
    }

    #[test]
    fn skipped_sessions_never_prepare_or_animate() {
        let mut session = PixelationSession::new(5);
        assert_eq!(session.prepare(true), None);
        assert_eq!(session.state(), PixelationState::Skipped);
        assert_eq!(session.prepare(false), None);
        assert!(!session.start());
        assert!(!session.abort());
    }

    #[test]
    fn zero_steps_draws_once_then_finishes() {
        let mut session = PixelationSession::new(0);
        assert_eq!(session.prepare(false), Some(0));
        assert_eq!(session.redraw_exponent(), Some(0));
        assert!(session.start());
        assert_eq!(session.redraw_exponent(), None);
        assert_eq!(session.advance(), Some(PixelationStep::Finish));
    }
}
