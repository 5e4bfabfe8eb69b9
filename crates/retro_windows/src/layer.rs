//! Float/dock layer manager.
//!
//! Floating moves a window out of its placeholder into the canvas overlay and locks the
//! placeholder to the window's measured footprint so the grid never shifts. Docking undoes both.
//! Canvas-wide passes collect per-window errors instead of stopping at the first one.

use platform_host::{ElementTree, StylePatch, StyleProp};
use tracing::debug;

use crate::config::BoundsConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{CanvasId, WindowId};
use crate::store::PresentationStore;

/// Moves a docked window into the canvas overlay without visually moving it, then applies its
/// presentation. Floating an already floated window only re-applies the presentation.
///
/// # Errors
///
/// Returns the stale-reference or measurement error; the placeholder lock is rolled back when the
/// move itself fails.
pub fn float_window<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    bounds: &BoundsConfig,
    window_id: WindowId,
) -> EngineResult<()> {
    let record = store
        .window(window_id)
        .ok_or(EngineError::WindowNotFound(window_id))?;
    if record.floated {
        return store.apply_presentation(tree, window_id, bounds);
    }
    let canvas_id = record.canvas;
    let keep_base = record.drag_locked || record.pinned.is_some();

    let canvas = store.canvas_node(tree, canvas_id)?;
    let window = store.window_node(tree, window_id)?;
    let placeholder = store.placeholder_node(tree, window_id)?;
    let canvas_rect = tree
        .rect(&canvas)
        .ok_or(EngineError::Unmeasurable("canvas"))?;
    let measured = tree
        .rect(&window)
        .ok_or(EngineError::Unmeasurable("window"))?
        .relative_to(canvas_rect);
    let overlay = tree
        .overlay_of(&canvas)
        .ok_or(EngineError::CanvasNotFound(canvas_id))?;

    tree.apply_style(
        &placeholder,
        &StylePatch::new()
            .px(StyleProp::MinWidth, measured.w)
            .px(StyleProp::MaxWidth, measured.w)
            .px(StyleProp::MinHeight, measured.h)
            .px(StyleProp::MaxHeight, measured.h),
    );
    if !tree.append_child(&overlay, &window) {
        tree.apply_style(
            &placeholder,
            &StylePatch::new().clear_all(&StyleProp::PLACEHOLDER_LOCK),
        );
        return Err(EngineError::Unmeasurable("overlay"));
    }

    if let Some(canvas_record) = store.canvas_mut(canvas_id) {
        canvas_record.size = canvas_rect.size();
    }
    if let Some(record) = store.window_mut(window_id) {
        if !keep_base {
            record.base = measured;
        }
        record.floated = true;
    }
    store.apply_presentation(tree, window_id, bounds)
}

/// Moves a floated window back into its placeholder and clears the styles floating added.
///
/// # Errors
///
/// Returns the stale-reference error for the window or its placeholder.
pub fn dock_window<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    window_id: WindowId,
) -> EngineResult<()> {
    if store.window(window_id).is_none() {
        return Err(EngineError::WindowNotFound(window_id));
    }
    let window = store.window_node(tree, window_id)?;
    let placeholder = store.placeholder_node(tree, window_id)?;

    tree.apply_style(
        &window,
        &StylePatch::new().clear_all(&StyleProp::WINDOW_OVERRIDES),
    );
    tree.apply_style(
        &placeholder,
        &StylePatch::new().clear_all(&StyleProp::PLACEHOLDER_LOCK),
    );
    if !tree.is_child_of(&placeholder, &window) && !tree.append_child(&placeholder, &window) {
        return Err(EngineError::PlaceholderMissing(window_id));
    }
    if let Some(record) = store.window_mut(window_id) {
        record.floated = false;
    }
    Ok(())
}

/// Floats every window of `canvas_id`. Returns the per-window failures.
pub fn float_canvas<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    bounds: &BoundsConfig,
    canvas_id: CanvasId,
) -> Vec<EngineError> {
    let mut errors = Vec::new();
    for window_id in store.windows_of(canvas_id) {
        if let Err(err) = float_window(store, tree, bounds, window_id) {
            debug!(canvas = %canvas_id, window = %window_id, %err, "float skipped");
            errors.push(err);
        }
    }
    errors
}

/// Docks every window of `canvas_id` that is not mid-gesture. Returns the per-window failures.
pub fn dock_canvas<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    canvas_id: CanvasId,
) -> Vec<EngineError> {
    let mut errors = Vec::new();
    for window_id in store.windows_of(canvas_id) {
        if store
            .window(window_id)
            .is_some_and(|record| record.drag_locked)
        {
            debug!(window = %window_id, "dock deferred while the window is held");
            continue;
        }
        if let Err(err) = dock_window(store, tree, window_id) {
            debug!(canvas = %canvas_id, window = %window_id, %err, "dock skipped");
            errors.push(err);
        }
    }
    errors
}

/// Moves floated windows to follow their placeholder's new grid position.
///
/// Only the base origin is re-measured; scatter transforms and pinned geometry are kept, and
/// windows held by a drag or resize are left alone.
pub fn reflow_canvas<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    bounds: &BoundsConfig,
    canvas_id: CanvasId,
) -> Vec<EngineError> {
    let Some(grid_mode) = store.canvas(canvas_id).map(|canvas| canvas.grid_mode) else {
        return vec![EngineError::CanvasNotFound(canvas_id)];
    };
    if grid_mode {
        return Vec::new();
    }
    let canvas_rect = match store
        .canvas_node(tree, canvas_id)
        .and_then(|node| tree.rect(&node).ok_or(EngineError::Unmeasurable("canvas")))
    {
        Ok(rect) => rect,
        Err(err) => {
            debug!(canvas = %canvas_id, %err, "reflow skipped");
            return vec![err];
        }
    };
    if let Some(canvas) = store.canvas_mut(canvas_id) {
        canvas.size = canvas_rect.size();
    }

    let mut errors = Vec::new();
    for window_id in store.windows_of(canvas_id) {
        let eligible = store
            .window(window_id)
            .is_some_and(|record| record.floated && !record.drag_locked);
        if !eligible {
            continue;
        }
        let result = store
            .placeholder_node(tree, window_id)
            .and_then(|node| {
                tree.rect(&node)
                    .ok_or(EngineError::Unmeasurable("placeholder"))
            })
            .and_then(|slot| {
                if let Some(record) = store.window_mut(window_id) {
                    record.base = record
                        .base
                        .with_origin(slot.relative_to(canvas_rect).origin());
                }
                store.apply_presentation(tree, window_id, bounds)
            });
        if let Err(err) = result {
            debug!(canvas = %canvas_id, window = %window_id, %err, "reflow pair skipped");
            errors.push(err);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use platform_host::{MemoryElementTree, MemoryNode, Rect};
    use pretty_assertions::assert_eq;

    use super::*;

    fn registered() -> (MemoryElementTree, PresentationStore, MemoryNode) {
        let mut tree = MemoryElementTree::new();
        let canvas = tree.add_canvas(Rect::new(10.0, 20.0, 1000.0, 800.0));
        tree.add_window_slot(canvas, Rect::new(60.0, 70.0, 300.0, 200.0));
        let mut store = PresentationStore::new();
        store.rescan(&mut tree);
        (tree, store, canvas)
    }

    #[test]
    fn float_locks_the_placeholder_and_keeps_the_window_in_place() {
        let (mut tree, mut store, canvas) = registered();
        let bounds = BoundsConfig::default();

        float_window(&mut store, &mut tree, &bounds, WindowId(1)).expect("floated");

        let window = store.window_node(&tree, WindowId(1)).expect("window");
        let placeholder = store.placeholder_node(&tree, WindowId(1)).expect("slot");
        let overlay = tree.overlay_of(&canvas).expect("overlay");
        assert!(tree.is_child_of(&overlay, &window));
        assert_eq!(tree.rect(&window), Some(Rect::new(60.0, 70.0, 300.0, 200.0)));
        assert_eq!(
            tree.inline_style(&placeholder, StyleProp::MinWidth).as_deref(),
            Some("300px")
        );
        assert_eq!(
            tree.inline_style(&placeholder, StyleProp::MaxHeight).as_deref(),
            Some("200px")
        );
        assert!(store.window(WindowId(1)).expect("record").floated);
    }

    #[test]
    fn docking_a_window_with_a_missing_placeholder_fails_without_panicking() {
        let (mut tree, mut store, _) = registered();
        let placeholder = store.placeholder_node(&tree, WindowId(1)).expect("slot");
        float_window(&mut store, &mut tree, &BoundsConfig::default(), WindowId(1))
            .expect("floated");
        tree.remove(placeholder);

        let errors = dock_canvas(&mut store, &mut tree, CanvasId(1));
        assert_eq!(errors, vec![EngineError::PlaceholderMissing(WindowId(1))]);
    }

    #[test]
    fn reflow_follows_the_placeholder_but_skips_held_windows() {
        let (mut tree, mut store, _) = registered();
        let bounds = BoundsConfig::default();
        float_window(&mut store, &mut tree, &bounds, WindowId(1)).expect("floated");

        let placeholder = store.placeholder_node(&tree, WindowId(1)).expect("slot");
        tree.set_layout(placeholder, Rect::new(110.0, 320.0, 300.0, 200.0));
        store.window_mut(WindowId(1)).expect("record").drag_locked = true;
        assert!(reflow_canvas(&mut store, &mut tree, &bounds, CanvasId(1)).is_empty());
        assert_eq!(
            store.window(WindowId(1)).expect("record").base.origin(),
            platform_host::Point::new(50.0, 50.0)
        );

        store.window_mut(WindowId(1)).expect("record").drag_locked = false;
        assert!(reflow_canvas(&mut store, &mut tree, &bounds, CanvasId(1)).is_empty());
        let window = store.window_node(&tree, WindowId(1)).expect("window");
        assert_eq!(tree.rect(&window), Some(Rect::new(110.0, 320.0, 300.0, 200.0)));
    }
}
