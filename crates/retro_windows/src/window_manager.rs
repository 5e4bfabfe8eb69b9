//! Shared window-manager helpers used by the interaction reducer and the layer manager.

use platform_host::{ElementTree, Point, Size, StylePatch, StyleProp};

use crate::config::{BoundsConfig, DragConfig};
use crate::error::{EngineError, EngineResult};
use crate::model::WindowId;
use crate::store::PresentationStore;

/// Clamps `value` into `[lo, hi]`, collapsing to `lo` when the range is inverted.
pub fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi.max(lo)).max(lo)
}

/// Clamps one axis of a window's origin so the window may overhang a container edge by at most
/// `overflow`.
pub fn clamp_axis(value: f64, size: f64, extent: f64, overflow: f64) -> f64 {
    clamp_between(value, -overflow, extent + overflow - size)
}

/// Clamps a canvas-relative origin against `canvas` and the configured overflow margins.
pub fn clamp_origin(origin: Point, size: Size, canvas: Size, bounds: &BoundsConfig) -> Point {
    Point::new(
        clamp_axis(origin.x, size.w, canvas.w, bounds.allow_overflow_x),
        clamp_axis(origin.y, size.h, canvas.h, bounds.allow_overflow_y),
    )
}

/// Applies a resize delta on top of the size captured at resize start, respecting the floor.
pub fn resized_size(start: Size, dx: f64, dy: f64, floor: &DragConfig) -> Size {
    Size::new(
        (start.w + dx).max(floor.min_width),
        (start.h + dy).max(floor.min_height),
    )
}

/// Raises `window_id` to one above the highest visible z-index and writes it to the element.
///
/// The scan and the write complete synchronously, so a second call sees the first call's result.
pub fn bring_to_front<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    window_id: WindowId,
) -> EngineResult<i32> {
    let node = store.window_node(tree, window_id)?;
    let z_index = store.max_visible_z() + 1;
    store
        .window_mut(window_id)
        .ok_or(EngineError::WindowNotFound(window_id))?
        .z_index = z_index;
    tree.apply_style(
        &node,
        &StylePatch::new().set(StyleProp::ZIndex, z_index.to_string()),
    );
    Ok(z_index)
}

/// Whether `window_id` sits strictly above every other visible window.
pub fn is_frontmost(store: &PresentationStore, window_id: WindowId) -> bool {
    let Some(record) = store.window(window_id) else {
        return false;
    };
    store
        .windows()
        .filter(|other| other.id != window_id && !other.hidden)
        .all(|other| other.z_index < record.z_index)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn drag_far_past_the_top_left_clamps_to_the_overflow_margin() {
        let bounds = BoundsConfig {
            allow_overflow_x: 100.0,
            allow_overflow_y: 150.0,
            ..BoundsConfig::default()
        };
        let clamped = clamp_origin(
            Point::new(-500.0, -500.0),
            Size::new(300.0, 200.0),
            Size::new(1000.0, 800.0),
            &bounds,
        );
        assert_eq!(clamped, Point::new(-100.0, -150.0));

        let clamped = clamp_origin(
            Point::new(5000.0, 5000.0),
            Size::new(300.0, 200.0),
            Size::new(1000.0, 800.0),
            &bounds,
        );
        assert_eq!(clamped, Point::new(800.0, 750.0));
    }

    #[test]
    fn resize_never_goes_below_the_floor() {
        let floor = DragConfig::default();
        assert_eq!(
            resized_size(Size::new(320.0, 240.0), -400.0, -400.0, &floor),
            Size::new(200.0, 100.0)
        );
        assert_eq!(
            resized_size(Size::new(320.0, 240.0), 30.0, -20.0, &floor),
            Size::new(350.0, 220.0)
        );
    }

    proptest! {
        #[test]
        fn clamped_axis_stays_inside_the_overflow_region(
            value in -5000.0f64..5000.0,
            size in 1.0f64..600.0,
            extent in 600.0f64..2000.0,
            overflow in 0.0f64..300.0,
        ) {
            let clamped = clamp_axis(value, size, extent, overflow);
            prop_assert!(clamped >= -overflow);
            prop_assert!(clamped + size <= extent + overflow + 1e-9);
        }
    }
}
