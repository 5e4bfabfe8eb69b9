//! Translates what a pointer or click landed on into window actions.
//!
//! The browser runtime resolves the event target with `closest()` lookups and fills a
//! [`PointerTarget`]; everything after that is plain data so it is tested on the host.

use platform_host::Point;
use retro_windows::{InteractionState, WindowAction, WindowId};

/// What the event target resolved to inside the window markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerTarget {
    /// Window containing the target, if any.
    pub window_id: Option<WindowId>,
    /// Target is inside the drag handle (header).
    pub on_drag_handle: bool,
    /// Target is inside the resize handle.
    pub on_resize_handle: bool,
    /// Target is inside the close control.
    pub on_close: bool,
    /// Target is inside a link.
    pub on_link: bool,
}

/// Pointer event phase as seen by the document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// `pointerdown`
    Down,
    /// `pointermove`
    Move,
    /// `pointerup` or `pointercancel`
    Up,
}

/// Maps one pointer event to the action the engine should apply, if any.
///
/// Move and up events ignore the target entirely: the active gesture owns them even when the
/// pointer has left the window.
pub fn pointer_action(
    phase: PointerPhase,
    target: &PointerTarget,
    pointer: Point,
    interaction: &InteractionState,
) -> Option<WindowAction> {
    match phase {
        PointerPhase::Down => {
            let window_id = target.window_id?;
            if target.on_close {
                Some(WindowAction::Close { window_id })
            } else if target.on_resize_handle {
                Some(WindowAction::BeginResize { window_id, pointer })
            } else if target.on_drag_handle && !target.on_link {
                Some(WindowAction::BeginDrag { window_id, pointer })
            } else {
                Some(WindowAction::PointerDownBody {
                    window_id,
                    on_link: target.on_link,
                })
            }
        }
        PointerPhase::Move => {
            if interaction.dragging.is_some() {
                Some(WindowAction::UpdateDrag { pointer })
            } else if interaction.resizing.is_some() {
                Some(WindowAction::UpdateResize { pointer })
            } else {
                None
            }
        }
        PointerPhase::Up => {
            if interaction.dragging.is_some() {
                Some(WindowAction::EndDrag)
            } else if interaction.resizing.is_some() {
                Some(WindowAction::EndResize)
            } else {
                None
            }
        }
    }
}

/// Maps a click to the link gate action. Only clicks on links inside a window matter.
pub fn click_action(target: &PointerTarget) -> Option<WindowAction> {
    match (target.window_id, target.on_link) {
        (Some(window_id), true) => Some(WindowAction::LinkClick { window_id }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use platform_host::Size;
    use pretty_assertions::assert_eq;
    use retro_windows::{DragSession, ResizeSession};

    use super::*;

    const POINTER: Point = Point::new(12.0, 34.0);

    fn in_window(id: u32) -> PointerTarget {
        PointerTarget {
            window_id: Some(WindowId(id)),
            ..PointerTarget::default()
        }
    }

    fn dragging() -> InteractionState {
        InteractionState {
            dragging: Some(DragSession {
                window_id: WindowId(1),
                canvas_origin: Point::new(0.0, 0.0),
                canvas_size: Size::new(800.0, 600.0),
                pointer_offset: Point::new(4.0, 4.0),
                size: Size::new(300.0, 200.0),
            }),
            resizing: None,
        }
    }

    #[test]
    fn header_press_begins_a_drag_unless_it_lands_on_a_link() {
        let header = PointerTarget {
            on_drag_handle: true,
            ..in_window(2)
        };
        assert_eq!(
            pointer_action(PointerPhase::Down, &header, POINTER, &InteractionState::default()),
            Some(WindowAction::BeginDrag {
                window_id: WindowId(2),
                pointer: POINTER,
            })
        );

        let header_link = PointerTarget {
            on_link: true,
            ..header
        };
        assert_eq!(
            pointer_action(
                PointerPhase::Down,
                &header_link,
                POINTER,
                &InteractionState::default()
            ),
            Some(WindowAction::PointerDownBody {
                window_id: WindowId(2),
                on_link: true,
            })
        );
    }

    #[test]
    fn close_and_resize_controls_take_priority_over_the_header() {
        let close = PointerTarget {
            on_drag_handle: true,
            on_close: true,
            ..in_window(3)
        };
        assert_eq!(
            pointer_action(PointerPhase::Down, &close, POINTER, &InteractionState::default()),
            Some(WindowAction::Close {
                window_id: WindowId(3)
            })
        );

        let resize = PointerTarget {
            on_resize_handle: true,
            ..in_window(3)
        };
        assert_eq!(
            pointer_action(PointerPhase::Down, &resize, POINTER, &InteractionState::default()),
            Some(WindowAction::BeginResize {
                window_id: WindowId(3),
                pointer: POINTER,
            })
        );
    }

    #[test]
    fn moves_and_releases_follow_the_active_gesture_anywhere_on_the_page() {
        let outside = PointerTarget::default();
        assert_eq!(
            pointer_action(PointerPhase::Move, &outside, POINTER, &dragging()),
            Some(WindowAction::UpdateDrag { pointer: POINTER })
        );
        assert_eq!(
            pointer_action(PointerPhase::Up, &outside, POINTER, &dragging()),
            Some(WindowAction::EndDrag)
        );

        let resizing = InteractionState {
            dragging: None,
            resizing: Some(ResizeSession {
                window_id: WindowId(1),
                pointer_start: Point::new(0.0, 0.0),
                size_start: Size::new(300.0, 200.0),
            }),
        };
        assert_eq!(
            pointer_action(PointerPhase::Up, &outside, POINTER, &resizing),
            Some(WindowAction::EndResize)
        );
        assert_eq!(
            pointer_action(PointerPhase::Move, &outside, POINTER, &InteractionState::default()),
            None
        );
    }

    #[test]
    fn presses_outside_any_window_are_ignored() {
        assert_eq!(
            pointer_action(
                PointerPhase::Down,
                &PointerTarget::default(),
                POINTER,
                &InteractionState::default()
            ),
            None
        );
    }

    #[test]
    fn only_link_clicks_inside_windows_reach_the_gate() {
        let link = PointerTarget {
            on_link: true,
            ..in_window(5)
        };
        assert_eq!(
            click_action(&link),
            Some(WindowAction::LinkClick {
                window_id: WindowId(5)
            })
        );
        assert_eq!(click_action(&in_window(5)), None);
        assert_eq!(
            click_action(&PointerTarget {
                on_link: true,
                ..PointerTarget::default()
            }),
            None
        );
    }
}
