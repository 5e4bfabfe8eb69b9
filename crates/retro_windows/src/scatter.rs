//! Scatter ("messy desktop") planning.
//!
//! A plan is an additive transform over a window's base geometry: a width override, a translate
//! offset and a z-index. Base geometry is never touched here, so scatter/unscatter cycles do not
//! drift.

use platform_host::{Rect, Size};
use serde::{Deserialize, Serialize};

use crate::config::{BoundsConfig, ScatterConfig};
use crate::model::{CanvasId, WindowId};
use crate::window_manager::clamp_between;

/// Cached scatter transform for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlan {
    /// Width override in CSS pixels.
    pub width: f64,
    /// Horizontal offset from the base position.
    pub translate_x: f64,
    /// Vertical offset from the base position.
    pub translate_y: f64,
    /// Stacking order assigned by the scatter.
    pub z_index: i32,
}

/// Where scatter randomness comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScatterMode {
    /// Fresh entropy on every call.
    Random,
    /// Reproducible stream per `(seed, canvas, window, index)`.
    Seeded(String),
}

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;
const GOLDEN_GAMMA: u32 = 0x9E37_79B9;

/// 32-bit FNV-1a.
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// splitmix32 finalizer.
pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(GOLDEN_GAMMA);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Small deterministic generator: a Weyl sequence fed through [`splitmix32`].
#[derive(Debug, Clone)]
pub struct ScatterRng {
    state: u32,
}

impl ScatterRng {
    /// Generator starting at `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Stream for one window in seeded mode.
    pub fn seeded(seed: &str, canvas: CanvasId, window: WindowId, index: usize) -> Self {
        let key = format!("{seed}|{canvas}|{window}|{index}");
        Self::new(fnv1a32(key.as_bytes()))
    }

    /// Next 32 random bits.
    pub fn next_u32(&mut self) -> u32 {
        let out = splitmix32(self.state);
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        out
    }

    /// Uniform in `[0, 1)` with 24 bits of precision.
    pub fn unit(&mut self) -> f64 {
        f64::from(self.next_u32() >> 8) / f64::from(1u32 << 24)
    }

    /// Uniform in `[lo, hi)`; returns `lo` when the range is empty.
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Uniform integer in `[lo, hi]`.
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (i64::from(hi) - i64::from(lo) + 1) as u64;
        let offset = u64::from(self.next_u32()) % span;
        (i64::from(lo) + offset as i64) as i32
    }
}

/// Widest window that still fits between the safe side paddings of the overflow region.
pub fn max_scatter_width(canvas: Size, bounds: &BoundsConfig) -> f64 {
    (canvas.w + 2.0 * bounds.allow_overflow_x - 2.0 * bounds.safe_side_padding).max(1.0)
}

/// Draws one plan from `rng`.
///
/// Jitter is applied first and the resulting left/top is clamped afterwards, so the jitter range
/// is honest while the window stays inside the canvas plus its overflow margins.
pub fn plan_window(
    rng: &mut ScatterRng,
    base: Rect,
    canvas: Size,
    scatter: &ScatterConfig,
    bounds: &BoundsConfig,
) -> ScatterPlan {
    let width = rng
        .range(scatter.min_width, scatter.max_width)
        .min(max_scatter_width(canvas, bounds));
    let jitter_x = rng.range(-scatter.jitter_x, scatter.jitter_x);
    let jitter_y = rng.range(-scatter.jitter_y, scatter.jitter_y);
    let z_index = rng.range_i32(scatter.min_z, scatter.max_z);

    let left = clamp_between(
        base.x + jitter_x,
        bounds.safe_side_padding - bounds.allow_overflow_x,
        canvas.w - bounds.safe_side_padding + bounds.allow_overflow_x - width,
    );
    let top = clamp_between(
        base.y + jitter_y,
        -bounds.allow_overflow_y,
        canvas.h + bounds.allow_overflow_y - base.h - bounds.safe_bottom_padding,
    );

    ScatterPlan {
        width,
        translate_x: left - base.x,
        translate_y: top - base.y,
        z_index,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds(ox: f64, oy: f64) -> BoundsConfig {
        BoundsConfig {
            allow_overflow_x: ox,
            allow_overflow_y: oy,
            ..BoundsConfig::default()
        }
    }

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a32(b""), 0x811C_9DC5);
        assert_eq!(fnv1a32(b"a"), 0xE40C_292C);
        assert_eq!(fnv1a32(b"foobar"), 0xBF9C_F968);
    }

    #[test]
    fn seeded_streams_differ_per_window_and_repeat_per_key() {
        let mut a = ScatterRng::seeded("desk", CanvasId(1), WindowId(1), 0);
        let mut b = ScatterRng::seeded("desk", CanvasId(1), WindowId(2), 1);
        let mut again = ScatterRng::seeded("desk", CanvasId(1), WindowId(1), 0);

        let first: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let other: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        let repeat: Vec<u32> = (0..4).map(|_| again.next_u32()).collect();
        assert_eq!(first, repeat);
        assert_ne!(first, other);
    }

    #[test]
    fn width_is_capped_on_narrow_canvases() {
        let scatter = ScatterConfig {
            min_width: 400.0,
            max_width: 420.0,
            ..ScatterConfig::default()
        };
        let mut rng = ScatterRng::new(7);
        let plan = plan_window(
            &mut rng,
            Rect::new(0.0, 0.0, 300.0, 120.0),
            Size::new(200.0, 600.0),
            &scatter,
            &bounds(50.0, 50.0),
        );
        assert_eq!(plan.width, 200.0 + 100.0 - 16.0);
    }

    proptest! {
        #[test]
        fn scattered_windows_stay_inside_overflow_region(
            seed in any::<u32>(),
            canvas_w in 320.0f64..1600.0,
            canvas_h in 400.0f64..1200.0,
            base_x in -200.0f64..1800.0,
            base_y in -200.0f64..1400.0,
            base_h in 40.0f64..240.0,
            jitter_x in 0.0f64..400.0,
            jitter_y in 0.0f64..400.0,
            ox in 0.0f64..200.0,
            oy in 0.0f64..200.0,
        ) {
            let scatter = ScatterConfig {
                jitter_x,
                jitter_y,
                ..ScatterConfig::default()
            };
            let bounds = bounds(ox, oy);
            let base = Rect::new(base_x, base_y, 300.0, base_h);
            let canvas = Size::new(canvas_w, canvas_h);
            let plan = plan_window(&mut ScatterRng::new(seed), base, canvas, &scatter, &bounds);

            let left = base.x + plan.translate_x;
            let top = base.y + plan.translate_y;
            let eps = 1e-6;
            prop_assert!(left >= -ox - eps);
            prop_assert!(left + plan.width <= canvas_w + ox + eps);
            prop_assert!(top >= -oy - eps);
            prop_assert!(top + base_h <= canvas_h + oy + eps);
            prop_assert!(plan.z_index >= scatter.min_z && plan.z_index <= scatter.max_z);
        }

        #[test]
        fn seeded_plans_are_reproducible(
            seed in "[a-z]{1,12}",
            canvas in 1u32..50,
            window in 1u32..500,
            index in 0usize..64,
        ) {
            let scatter = ScatterConfig::default();
            let bounds = BoundsConfig::default();
            let base = Rect::new(40.0, 60.0, 300.0, 180.0);
            let size = Size::new(1200.0, 900.0);
            let first = plan_window(
                &mut ScatterRng::seeded(&seed, CanvasId(canvas), WindowId(window), index),
                base, size, &scatter, &bounds,
            );
            let second = plan_window(
                &mut ScatterRng::seeded(&seed, CanvasId(canvas), WindowId(window), index),
                base, size, &scatter, &bounds,
            );
            prop_assert_eq!(first, second);
        }
    }
}
