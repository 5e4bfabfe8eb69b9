//! Pointer interaction actions, side-effect intents, and transition logic for windows.

use platform_host::{ElementTree, Point, StylePatch, StyleProp, WINDOW_STATE_ATTR};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::layer;
use crate::model::{
    DragSession, InteractionState, PinnedGeometry, ResizeSession, WindowGesture, WindowId,
};
use crate::store::PresentationStore;
use crate::window_manager::{bring_to_front, clamp_origin, is_frontmost, resized_size};

/// Actions accepted by [`reduce_window`]. Pointer positions are in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowAction {
    /// Pointer-down on a window's drag handle.
    BeginDrag {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at drag start.
        pointer: Point,
    },
    /// Pointer-move while a drag is active.
    UpdateDrag {
        /// Current pointer position.
        pointer: Point,
    },
    /// Pointer-up ending the active drag.
    EndDrag,
    /// Pointer-down on a window's resize handle.
    BeginResize {
        /// Window being resized.
        window_id: WindowId,
        /// Pointer position at resize start.
        pointer: Point,
    },
    /// Pointer-move while a resize is active.
    UpdateResize {
        /// Current pointer position.
        pointer: Point,
    },
    /// Pointer-up ending the active resize.
    EndResize,
    /// Pointer-down anywhere else inside a window.
    PointerDownBody {
        /// Window under the pointer.
        window_id: WindowId,
        /// Whether the pointer-down landed on a link.
        on_link: bool,
    },
    /// Click on a link inside a window.
    LinkClick {
        /// Window holding the link.
        window_id: WindowId,
    },
    /// Programmatic focus.
    BringToFront {
        /// Window to raise.
        window_id: WindowId,
    },
    /// Close control clicked.
    Close {
        /// Window to hide.
        window_id: WindowId,
    },
}

/// Side effects the host adapter performs on the originating event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEffect {
    /// Prevent the link's default navigation.
    CancelNavigation,
    /// Capture the pointer so moves outside the window keep reaching the gesture.
    CapturePointer,
    /// Release a previously captured pointer.
    ReleasePointer,
}

/// Applies `action` to the store and the element tree and returns the host effects.
///
/// Drag and resize are mutually exclusive: a begin action is ignored while the other gesture is
/// active. Move actions compute absolute targets from the captured session, so repeated moves
/// between frames never accumulate.
///
/// # Errors
///
/// Returns an [`EngineError`] when the target window or its canvas no longer resolves.
pub fn reduce_window<T: ElementTree>(
    store: &mut PresentationStore,
    interaction: &mut InteractionState,
    tree: &mut T,
    config: &EngineConfig,
    action: WindowAction,
) -> EngineResult<Vec<InteractionEffect>> {
    let mut effects = Vec::new();
    match action {
        WindowAction::BeginDrag { window_id, pointer } => {
            if !interaction.is_idle() {
                return Ok(effects);
            }
            let geometry = begin_gesture(store, tree, config, window_id)?;
            interaction.dragging = Some(DragSession {
                window_id,
                canvas_origin: geometry.canvas_origin,
                canvas_size: geometry.canvas_size,
                pointer_offset: Point::new(
                    pointer.x - (geometry.canvas_origin.x + geometry.pinned.left),
                    pointer.y - (geometry.canvas_origin.y + geometry.pinned.top),
                ),
                size: geometry.pinned.size(),
            });
            set_gesture(store, tree, window_id, WindowGesture::Dragging);
            effects.push(InteractionEffect::CapturePointer);
        }
        WindowAction::UpdateDrag { pointer } => {
            if let Some(session) = interaction.dragging.as_ref() {
                let target = Point::new(
                    pointer.x - session.canvas_origin.x - session.pointer_offset.x,
                    pointer.y - session.canvas_origin.y - session.pointer_offset.y,
                );
                let origin = clamp_origin(target, session.size, session.canvas_size, &config.bounds);
                let pinned = PinnedGeometry {
                    left: origin.x,
                    top: origin.y,
                    width: session.size.w,
                    height: session.size.h,
                };
                pin_window(store, tree, session.window_id, pinned)?;
            }
        }
        WindowAction::EndDrag => {
            if let Some(session) = interaction.dragging.take() {
                release_gesture(store, tree, session.window_id);
                effects.push(InteractionEffect::ReleasePointer);
            }
        }
        WindowAction::BeginResize { window_id, pointer } => {
            if !interaction.is_idle() {
                return Ok(effects);
            }
            let geometry = begin_gesture(store, tree, config, window_id)?;
            interaction.resizing = Some(ResizeSession {
                window_id,
                pointer_start: pointer,
                size_start: geometry.pinned.size(),
            });
            set_gesture(store, tree, window_id, WindowGesture::Resizing);
            effects.push(InteractionEffect::CapturePointer);
        }
        WindowAction::UpdateResize { pointer } => {
            if let Some(session) = interaction.resizing.as_ref() {
                let size = resized_size(
                    session.size_start,
                    pointer.x - session.pointer_start.x,
                    pointer.y - session.pointer_start.y,
                    &config.drag,
                );
                let current = store
                    .window(session.window_id)
                    .and_then(|record| record.pinned)
                    .ok_or(EngineError::WindowNotFound(session.window_id))?;
                let pinned = PinnedGeometry {
                    width: size.w,
                    height: size.h,
                    ..current
                };
                pin_window(store, tree, session.window_id, pinned)?;
            }
        }
        WindowAction::EndResize => {
            if let Some(session) = interaction.resizing.take() {
                release_gesture(store, tree, session.window_id);
                effects.push(InteractionEffect::ReleasePointer);
            }
        }
        WindowAction::PointerDownBody { window_id, on_link } => {
            if !on_link {
                bring_to_front(store, tree, window_id)?;
            }
        }
        WindowAction::LinkClick { window_id } => {
            if !is_frontmost(store, window_id) {
                bring_to_front(store, tree, window_id)?;
                effects.push(InteractionEffect::CancelNavigation);
            }
        }
        WindowAction::BringToFront { window_id } => {
            bring_to_front(store, tree, window_id)?;
        }
        WindowAction::Close { window_id } => {
            let node = store.window_node(tree, window_id)?;
            tree.apply_style(&node, &StylePatch::new().set(StyleProp::Display, "none"));
            if let Some(record) = store.window_mut(window_id) {
                record.hidden = true;
            }
            let held = |id: WindowId| id == window_id;
            if interaction
                .dragging
                .as_ref()
                .is_some_and(|session| held(session.window_id))
            {
                interaction.dragging = None;
                release_gesture(store, tree, window_id);
                effects.push(InteractionEffect::ReleasePointer);
            }
            if interaction
                .resizing
                .as_ref()
                .is_some_and(|session| held(session.window_id))
            {
                interaction.resizing = None;
                release_gesture(store, tree, window_id);
                effects.push(InteractionEffect::ReleasePointer);
            }
        }
    }
    Ok(effects)
}

struct GestureStart {
    canvas_origin: Point,
    canvas_size: platform_host::Size,
    pinned: PinnedGeometry,
}

/// Floats the window if needed, pins it where it currently appears, locks it against automated
/// passes and raises it.
fn begin_gesture<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    config: &EngineConfig,
    window_id: WindowId,
) -> EngineResult<GestureStart> {
    let canvas_id = store
        .window(window_id)
        .map(|record| record.canvas)
        .ok_or(EngineError::WindowNotFound(window_id))?;
    layer::float_window(store, tree, &config.bounds, window_id)?;

    let canvas_rect = store
        .canvas_node(tree, canvas_id)
        .and_then(|node| tree.rect(&node).ok_or(EngineError::Unmeasurable("canvas")))?;
    let window_rect = store
        .window_node(tree, window_id)
        .and_then(|node| tree.rect(&node).ok_or(EngineError::Unmeasurable("window")))?
        .relative_to(canvas_rect);
    let pinned = PinnedGeometry {
        left: window_rect.x,
        top: window_rect.y,
        width: window_rect.w,
        height: window_rect.h,
    };

    if let Some(record) = store.window_mut(window_id) {
        record.drag_locked = true;
    }
    pin_window(store, tree, window_id, pinned)?;
    bring_to_front(store, tree, window_id)?;
    Ok(GestureStart {
        canvas_origin: canvas_rect.origin(),
        canvas_size: canvas_rect.size(),
        pinned,
    })
}

fn pin_window<T: ElementTree>(
    store: &mut PresentationStore,
    tree: &mut T,
    window_id: WindowId,
    pinned: PinnedGeometry,
) -> EngineResult<()> {
    let node = store.window_node(tree, window_id)?;
    store
        .window_mut(window_id)
        .ok_or(EngineError::WindowNotFound(window_id))?
        .pinned = Some(pinned);
    tree.apply_style(
        &node,
        &StylePatch::new()
            .set(StyleProp::Position, "absolute")
            .px(StyleProp::Left, pinned.left)
            .px(StyleProp::Top, pinned.top)
            .px(StyleProp::Width, pinned.width)
            .px(StyleProp::Height, pinned.height)
            .clear(StyleProp::Transform),
    );
    Ok(())
}

fn release_gesture<T: ElementTree>(store: &mut PresentationStore, tree: &mut T, window_id: WindowId) {
    if let Some(record) = store.window_mut(window_id) {
        record.drag_locked = false;
    }
    set_gesture(store, tree, window_id, WindowGesture::Settled);
}

fn set_gesture<T: ElementTree>(
    store: &PresentationStore,
    tree: &mut T,
    window_id: WindowId,
    gesture: WindowGesture,
) {
    if let Ok(node) = store.window_node(tree, window_id) {
        tree.set_attr(&node, WINDOW_STATE_ATTR, gesture.attr_value());
    }
}

#[cfg(test)]
mod tests {
    use platform_host::{MemoryElementTree, Rect};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::BoundsConfig;

    fn desk() -> (MemoryElementTree, PresentationStore, InteractionState, EngineConfig) {
        let mut tree = MemoryElementTree::new();
        let canvas = tree.add_canvas(Rect::new(0.0, 0.0, 1000.0, 800.0));
        tree.add_window_slot(canvas, Rect::new(50.0, 50.0, 300.0, 200.0));
        tree.add_window_slot(canvas, Rect::new(400.0, 50.0, 300.0, 200.0));
        let mut store = PresentationStore::new();
        store.rescan(&mut tree);
        let config = EngineConfig {
            bounds: BoundsConfig {
                allow_overflow_x: 100.0,
                allow_overflow_y: 150.0,
                ..BoundsConfig::default()
            },
            ..EngineConfig::default()
        };
        (tree, store, InteractionState::default(), config)
    }

    #[test]
    fn drag_moves_from_captured_start_and_keeps_size_after_release() {
        let (mut tree, mut store, mut interaction, config) = desk();

        let effects = reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::BeginDrag {
                window_id: WindowId(1),
                pointer: Point::new(60.0, 60.0),
            },
        )
        .expect("begin");
        assert_eq!(effects, vec![InteractionEffect::CapturePointer]);

        for _ in 0..3 {
            reduce_window(
                &mut store,
                &mut interaction,
                &mut tree,
                &config,
                WindowAction::UpdateDrag {
                    pointer: Point::new(85.0, 100.0),
                },
            )
            .expect("move");
        }
        let effects = reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::EndDrag,
        )
        .expect("end");

        assert_eq!(effects, vec![InteractionEffect::ReleasePointer]);
        let window = store.window_node(&tree, WindowId(1)).expect("node");
        assert_eq!(tree.rect(&window), Some(Rect::new(75.0, 90.0, 300.0, 200.0)));
        assert_eq!(
            tree.attr(&window, WINDOW_STATE_ATTR).as_deref(),
            Some("settled")
        );
        let record = store.window(WindowId(1)).expect("record");
        assert!(!record.drag_locked);
        assert_eq!(record.pinned.map(|pin| pin.width), Some(300.0));
    }

    #[test]
    fn resize_is_ignored_while_dragging_and_floors_at_minimum() {
        let (mut tree, mut store, mut interaction, config) = desk();
        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::BeginDrag {
                window_id: WindowId(1),
                pointer: Point::new(60.0, 60.0),
            },
        )
        .expect("begin drag");
        let effects = reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::BeginResize {
                window_id: WindowId(2),
                pointer: Point::new(700.0, 250.0),
            },
        )
        .expect("ignored");
        assert!(effects.is_empty());
        assert!(interaction.resizing.is_none());

        reduce_window(&mut store, &mut interaction, &mut tree, &config, WindowAction::EndDrag)
            .expect("end drag");
        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::BeginResize {
                window_id: WindowId(2),
                pointer: Point::new(700.0, 250.0),
            },
        )
        .expect("begin resize");
        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::UpdateResize {
                pointer: Point::new(100.0, 0.0),
            },
        )
        .expect("shrink");

        let window = store.window_node(&tree, WindowId(2)).expect("node");
        assert_eq!(
            tree.rect(&window).map(|rect| rect.size()),
            Some(platform_host::Size::new(200.0, 100.0))
        );
    }

    #[test]
    fn close_hides_the_window_without_removing_it() {
        let (mut tree, mut store, mut interaction, config) = desk();
        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::Close {
                window_id: WindowId(2),
            },
        )
        .expect("close");

        let window = store.window_node(&tree, WindowId(2)).expect("still present");
        assert_eq!(
            tree.inline_style(&window, StyleProp::Display).as_deref(),
            Some("none")
        );
        assert!(store.window(WindowId(2)).expect("record").hidden);
    }

    #[test]
    fn pointer_down_on_a_link_does_not_raise() {
        let (mut tree, mut store, mut interaction, config) = desk();
        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::PointerDownBody {
                window_id: WindowId(1),
                on_link: true,
            },
        )
        .expect("down");
        assert_eq!(store.window(WindowId(1)).expect("record").z_index, 0);

        reduce_window(
            &mut store,
            &mut interaction,
            &mut tree,
            &config,
            WindowAction::PointerDownBody {
                window_id: WindowId(1),
                on_link: false,
            },
        )
        .expect("down");
        assert_eq!(store.window(WindowId(1)).expect("record").z_index, 1);
    }
}
