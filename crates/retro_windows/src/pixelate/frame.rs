//! Frame geometry and step timing for the pixelation reveal.

use platform_host::{FramePlan, ObjectFit, Rect, Size};

use crate::config::PixelateConfig;
use crate::scatter::ScatterRng;

/// Plans one frame at `2^exponent` downscale.
///
/// `rendered` is re-measured by the caller on every step so layout shifts mid-animation are
/// tolerated. Zero sizes are floored to one pixel.
pub fn plan_frame(exponent: u32, rendered: Size, natural: Size, fit: ObjectFit) -> FramePlan {
    let canvas = rendered.to_pixels();
    let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    let small = ((canvas.0 / factor).max(1), (canvas.1 / factor).max(1));

    let canvas_size = Size::new(f64::from(canvas.0), f64::from(canvas.1));
    let (source, dest) = fit_rects(natural.at_least_one(), canvas_size, fit);
    let sx = f64::from(small.0) / canvas_size.w;
    let sy = f64::from(small.1) / canvas_size.h;

    FramePlan {
        exponent,
        canvas,
        small,
        source,
        small_dest: Rect::new(dest.x * sx, dest.y * sy, dest.w * sx, dest.h * sy),
    }
}

/// Source crop (natural pixels) and destination box (canvas pixels) replicating `object-fit`.
pub fn fit_rects(natural: Size, canvas: Size, fit: ObjectFit) -> (Rect, Rect) {
    let full_source = Rect::new(0.0, 0.0, natural.w, natural.h);
    let full_dest = Rect::new(0.0, 0.0, canvas.w, canvas.h);
    match fit {
        ObjectFit::Fill => (full_source, full_dest),
        ObjectFit::Cover => {
            let scale = (canvas.w / natural.w).max(canvas.h / natural.h);
            let w = canvas.w / scale;
            let h = canvas.h / scale;
            (
                Rect::new((natural.w - w) / 2.0, (natural.h - h) / 2.0, w, h),
                full_dest,
            )
        }
        ObjectFit::Contain => {
            let scale = (canvas.w / natural.w).min(canvas.h / natural.h);
            let w = natural.w * scale;
            let h = natural.h * scale;
            (
                full_source,
                Rect::new((canvas.w - w) / 2.0, (canvas.h - h) / 2.0, w, h),
            )
        }
    }
}

/// Randomized per-step delay window derived from the target duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDelays {
    /// Shortest delay between steps.
    pub min_ms: u32,
    /// Longest delay between steps.
    pub max_ms: u32,
}

impl StepDelays {
    /// Centres the window on `total_duration_ms / (steps + 1)`, never below the configured floor.
    /// Arithmetic saturates, so unvalidated extremes give a wide window instead of a panic.
    pub fn from_config(config: &PixelateConfig) -> Self {
        let base = config.total_duration_ms / config.steps.saturating_add(1);
        let min_ms = config.min_step_delay_ms;
        let max_ms = min_ms.max(base.saturating_mul(2).saturating_sub(min_ms));
        Self { min_ms, max_ms }
    }

    /// Uniform delay in `[min_ms, max_ms]`.
    pub fn pick(&self, rng: &mut ScatterRng) -> u32 {
        rng.range(f64::from(self.min_ms), f64::from(self.max_ms) + 1.0)
            .floor()
            .min(f64::from(self.max_ms)) as u32
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn small_canvas_halves_per_exponent_and_never_collapses() {
        let plan = plan_frame(2, Size::new(400.0, 300.0), Size::new(800.0, 600.0), ObjectFit::Fill);
        assert_eq!(plan.canvas, (400, 300));
        assert_eq!(plan.small, (100, 75));
        assert_eq!(plan.small_dest, Rect::new(0.0, 0.0, 100.0, 75.0));

        let tiny = plan_frame(12, Size::new(0.0, 3.0), Size::new(10.0, 10.0), ObjectFit::Fill);
        assert_eq!(tiny.canvas, (1, 3));
        assert_eq!(tiny.small, (1, 1));
    }

    #[test]
    fn cover_crops_the_source_to_the_box_aspect() {
        let (source, dest) = fit_rects(
            Size::new(1000.0, 500.0),
            Size::new(200.0, 200.0),
            ObjectFit::Cover,
        );
        assert_eq!(source, Rect::new(250.0, 0.0, 500.0, 500.0));
        assert_eq!(dest, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn contain_letterboxes_the_destination() {
        let (source, dest) = fit_rects(
            Size::new(1000.0, 500.0),
            Size::new(200.0, 200.0),
            ObjectFit::Contain,
        );
        assert_eq!(source, Rect::new(0.0, 0.0, 1000.0, 500.0));
        assert_eq!(dest, Rect::new(0.0, 50.0, 200.0, 100.0));
    }

    #[test]
    fn step_delays_bracket_the_average_step() {
        let delays = StepDelays::from_config(&PixelateConfig::default());
        assert_eq!(delays, StepDelays { min_ms: 60, max_ms: 240 });

        let mut rng = ScatterRng::new(3);
        for _ in 0..200 {
            let delay = delays.pick(&mut rng);
            assert!((60..=240).contains(&delay));
        }

        let slow_floor = StepDelays::from_config(&PixelateConfig {
            min_step_delay_ms: 500,
            ..PixelateConfig::default()
        });
        assert_eq!(slow_floor.max_ms, 500);
    }

    #[test]
    fn step_delays_saturate_on_unvalidated_extremes() {
        let deepest = StepDelays::from_config(&PixelateConfig {
            steps: u32::MAX,
            ..PixelateConfig::default()
        });
        assert_eq!(deepest, StepDelays { min_ms: 60, max_ms: 60 });

        let longest = StepDelays::from_config(&PixelateConfig {
            steps: 0,
            total_duration_ms: 4_000_000_000,
            min_step_delay_ms: 0,
            ..PixelateConfig::default()
        });
        assert_eq!(longest, StepDelays { min_ms: 0, max_ms: u32::MAX });
        longest.pick(&mut ScatterRng::new(5));
    }
}
