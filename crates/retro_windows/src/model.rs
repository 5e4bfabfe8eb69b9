//! Records and identifiers held by the presentation store.

use std::fmt;

use platform_host::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::scatter::ScatterPlan;

/// Stable canvas id, written to `data-canvas-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanvasId(pub u32);

/// Stable window id, written to `data-window-id` and `data-placeholder-for`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u32);

macro_rules! impl_attr_id {
    ($name:ident) => {
        impl $name {
            /// Parses the decimal form written to the element's id attribute.
            pub fn parse_attr(value: &str) -> Option<Self> {
                value.trim().parse::<u32>().ok().filter(|id| *id > 0).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_attr_id!(CanvasId);
impl_attr_id!(WindowId);

/// Position and size fixed by the user through a drag or resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinnedGeometry {
    /// Left edge relative to the canvas.
    pub left: f64,
    /// Top edge relative to the canvas.
    pub top: f64,
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl PinnedGeometry {
    /// Top-left corner.
    pub fn origin(self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Width and height.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Mirrors the `data-window-state` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowGesture {
    /// No gesture in progress.
    Settled,
    /// Being moved by its drag handle.
    Dragging,
    /// Being resized from its corner handle.
    Resizing,
}

impl WindowGesture {
    /// Value written to `data-window-state`.
    pub const fn attr_value(self) -> &'static str {
        match self {
            Self::Settled => "settled",
            Self::Dragging => "dragging",
            Self::Resizing => "resizing",
        }
    }
}

/// Everything the engine knows about one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Window id.
    pub id: WindowId,
    /// Owning canvas.
    pub canvas: CanvasId,
    /// Position among the canvas's placeholders; feeds the seeded scatter hash.
    pub index: usize,
    /// Grid position relative to the canvas, measured while docked.
    pub base: Rect,
    /// Cached scatter transform, kept across grid-mode toggles.
    pub scatter: Option<ScatterPlan>,
    /// Geometry fixed by the last drag or resize; wins over scatter.
    pub pinned: Option<PinnedGeometry>,
    /// Last z-index written to the element.
    pub z_index: i32,
    /// Lives in the canvas overlay rather than its placeholder.
    pub floated: bool,
    /// Held by a drag or resize; reflow and dock leave it alone.
    pub drag_locked: bool,
    /// Closed by the user.
    pub hidden: bool,
}

impl WindowRecord {
    /// Unmeasured, docked record.
    pub fn new(id: WindowId, canvas: CanvasId, index: usize) -> Self {
        Self {
            id,
            canvas,
            index,
            base: Rect::default(),
            scatter: None,
            pinned: None,
            z_index: 0,
            floated: false,
            drag_locked: false,
            hidden: false,
        }
    }
}

/// One registered canvas and its windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasRecord {
    /// Canvas id.
    pub id: CanvasId,
    /// Last measured size.
    pub size: Size,
    /// `true` keeps every window docked in normal flow.
    pub grid_mode: bool,
    /// Windows in placeholder order.
    pub windows: Vec<WindowId>,
}

impl CanvasRecord {
    /// Empty record in scatter mode.
    pub fn new(id: CanvasId) -> Self {
        Self {
            id,
            size: Size::default(),
            grid_mode: false,
            windows: Vec::new(),
        }
    }
}

/// Drag captured at pointer down.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Window being moved or resized.
    pub window_id: WindowId,
    /// Canvas client origin captured at drag start.
    pub canvas_origin: Point,
    /// Canvas size captured at drag start; bounds the clamp.
    pub canvas_size: Size,
    /// Pointer position minus the window's top-left at drag start.
    pub pointer_offset: Point,
    /// Window size locked for the whole drag.
    pub size: Size,
}

/// Resize captured at pointer down.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    /// Window being moved or resized.
    pub window_id: WindowId,
    /// Pointer position at resize start.
    pub pointer_start: Point,
    /// Window size at resize start.
    pub size_start: Size,
}

/// Active pointer gesture. Drag and resize are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    /// Drag in progress.
    pub dragging: Option<DragSession>,
    /// Resize in progress.
    pub resizing: Option<ResizeSession>,
}

impl InteractionState {
    /// Neither dragging nor resizing.
    pub fn is_idle(&self) -> bool {
        self.dragging.is_none() && self.resizing.is_none()
    }
}

/// Which canvases a grid-mode toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridScope {
    /// Every registered canvas.
    All,
    /// One canvas.
    Canvas(CanvasId),
}

impl GridScope {
    /// Whether `canvas` falls within the scope.
    pub fn includes(self, canvas: CanvasId) -> bool {
        match self {
            Self::All => true,
            Self::Canvas(id) => id == canvas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_ids_parse_positive_decimals_only() {
        assert_eq!(WindowId::parse_attr("12"), Some(WindowId(12)));
        assert_eq!(WindowId::parse_attr(" 3 "), Some(WindowId(3)));
        assert_eq!(WindowId::parse_attr("0"), None);
        assert_eq!(CanvasId::parse_attr("abc"), None);
        assert_eq!(CanvasId(5).to_string(), "5");
    }

    #[test]
    fn grid_scope_matches_canvas() {
        assert!(GridScope::All.includes(CanvasId(9)));
        assert!(GridScope::Canvas(CanvasId(2)).includes(CanvasId(2)));
        assert!(!GridScope::Canvas(CanvasId(2)).includes(CanvasId(3)));
    }
}
