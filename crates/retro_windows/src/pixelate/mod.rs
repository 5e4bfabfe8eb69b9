//! Pixelation reveal: frame planning, the per-image state machine, and the timer-driven runner.

mod driver;
mod frame;
mod session;

pub use driver::PixelationDriver;
pub use frame::{fit_rects, plan_frame, StepDelays};
pub use session::{PixelationSession, PixelationState, PixelationStep};
