//! Element-tree contract between the presentation engine and a rendered document.
//!
//! The engine never touches browser APIs directly. It reads structure and measurements through
//! [`ElementTree`] and writes inline style through [`StylePatch`], so the same logic runs against
//! the live DOM (`platform_host_web`) and against [`crate::MemoryElementTree`] in tests.

use std::fmt;

use crate::geometry::Rect;

/// Marks a layout container that hosts windows.
pub const CANVAS_MARKER_ATTR: &str = "data-retro-canvas";
/// Stable canvas id assigned on first scan.
pub const CANVAS_ID_ATTR: &str = "data-canvas-id";
/// Marks the absolutely-positioned overlay sublayer of a canvas.
pub const OVERLAY_MARKER_ATTR: &str = "data-retro-overlay";
/// Marks a grid slot that reserves space for one window.
pub const PLACEHOLDER_MARKER_ATTR: &str = "data-retro-placeholder";
/// Pairs a placeholder with the id of the window it holds.
pub const PLACEHOLDER_FOR_ATTR: &str = "data-placeholder-for";
/// Marks a draggable window element.
pub const WINDOW_MARKER_ATTR: &str = "data-retro-window";
/// Stable window id assigned on first discovery.
pub const WINDOW_ID_ATTR: &str = "data-window-id";
/// Mirrors the interaction state of a window (`settled`, `dragging`, `resizing`).
pub const WINDOW_STATE_ATTR: &str = "data-window-state";
/// Marks the drag handle (header) of a window.
pub const DRAG_HANDLE_ATTR: &str = "data-retro-drag-handle";
/// Marks the close control of a window.
pub const CLOSE_CONTROL_ATTR: &str = "data-retro-close";
/// Marks the resize handle of a window.
pub const RESIZE_HANDLE_ATTR: &str = "data-retro-resize";
/// Opts an image (or every image below an element) out of the pixelation effect.
pub const NO_PIXELATE_ATTR: &str = "data-no-pixelate";
/// Marks the container observed for viewport entry by the pixelation effect.
pub const PIXELATE_ROOT_ATTR: &str = "data-pixelate-root";

/// Inline style properties the engine is allowed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProp {
    /// `position`
    Position,
    /// `left`
    Left,
    /// `top`
    Top,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `min-width`
    MinWidth,
    /// `max-width`
    MaxWidth,
    /// `min-height`
    MinHeight,
    /// `max-height`
    MaxHeight,
    /// `transform`
    Transform,
    /// `z-index`
    ZIndex,
    /// `display`
    Display,
}

impl StyleProp {
    /// Properties written when a window is floated or presented.
    pub const WINDOW_OVERRIDES: [StyleProp; 7] = [
        Self::Position,
        Self::Left,
        Self::Top,
        Self::Width,
        Self::Height,
        Self::Transform,
        Self::ZIndex,
    ];

    /// Properties used to lock a placeholder footprint.
    pub const PLACEHOLDER_LOCK: [StyleProp; 4] = [
        Self::MinWidth,
        Self::MaxWidth,
        Self::MinHeight,
        Self::MaxHeight,
    ];

    /// CSS property name.
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::MinWidth => "min-width",
            Self::MaxWidth => "max-width",
            Self::MinHeight => "min-height",
            Self::MaxHeight => "max-height",
            Self::Transform => "transform",
            Self::ZIndex => "z-index",
            Self::Display => "display",
        }
    }
}

impl fmt::Display for StyleProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Ordered list of inline style writes; `None` removes the property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StylePatch {
    entries: Vec<(StyleProp, Option<String>)>,
}

impl StylePatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` to `prop`.
    pub fn set(mut self, prop: StyleProp, value: impl Into<String>) -> Self {
        self.entries.push((prop, Some(value.into())));
        self
    }

    /// Sets a pixel length, rounded to two decimals to keep the written CSS stable.
    pub fn px(self, prop: StyleProp, value: f64) -> Self {
        let rounded = (value * 100.0).round() / 100.0;
        self.set(prop, format!("{rounded}px"))
    }

    /// Removes `prop` from the inline style.
    pub fn clear(mut self, prop: StyleProp) -> Self {
        self.entries.push((prop, None));
        self
    }

    /// Removes every property in `props`.
    pub fn clear_all(self, props: &[StyleProp]) -> Self {
        props.iter().fold(self, |patch, prop| patch.clear(*prop))
    }

    /// Writes in application order.
    pub fn entries(&self) -> &[(StyleProp, Option<String>)] {
        &self.entries
    }

    /// Whether the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read/write access to the rendered element tree.
///
/// Implementations treat every failure as absence: lookups return `None`/empty and writes to
/// detached nodes are ignored. Callers decide whether absence is worth reporting.
pub trait ElementTree {
    /// Cheap handle to one element.
    type Node: Clone + fmt::Debug;

    /// All canvas containers in document order.
    fn canvases(&self) -> Vec<Self::Node>;

    /// Placeholders inside `canvas`, in document order.
    fn placeholders(&self, canvas: &Self::Node) -> Vec<Self::Node>;

    /// The window element currently resting directly inside `placeholder`, if any.
    fn window_in(&self, placeholder: &Self::Node) -> Option<Self::Node>;

    /// Finds the first element whose attribute `name` equals `value`.
    fn find_by_attr(&self, name: &str, value: &str) -> Option<Self::Node>;

    /// Value of attribute `name`.
    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Sets attribute `name`.
    fn set_attr(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Removes attribute `name`.
    fn remove_attr(&mut self, node: &Self::Node, name: &str);

    /// Border-box rectangle in viewport coordinates; `None` when the node is detached.
    fn rect(&self, node: &Self::Node) -> Option<Rect>;

    /// Returns the overlay sublayer of `canvas`, creating it on first use.
    fn overlay_of(&mut self, canvas: &Self::Node) -> Option<Self::Node>;

    /// Moves `child` to the end of `parent`'s children. Returns `false` if the move failed.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> bool;

    /// Whether `child` is a direct child of `parent`.
    fn is_child_of(&self, parent: &Self::Node, child: &Self::Node) -> bool;

    /// Applies every write in `patch` in order.
    fn apply_style(&mut self, node: &Self::Node, patch: &StylePatch);

    /// Current inline value of `prop`, if set.
    fn inline_style(&self, node: &Self::Node, prop: StyleProp) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn style_patch_keeps_write_order_and_rounds_pixels() {
        let patch = StylePatch::new()
            .set(StyleProp::Position, "absolute")
            .px(StyleProp::Left, 12.345)
            .clear(StyleProp::Transform);

        assert_eq!(
            patch.entries(),
            &[
                (StyleProp::Position, Some("absolute".to_string())),
                (StyleProp::Left, Some("12.35px".to_string())),
                (StyleProp::Transform, None),
            ]
        );
    }

    #[test]
    fn clear_all_emits_one_removal_per_property() {
        let patch = StylePatch::new().clear_all(&StyleProp::PLACEHOLDER_LOCK);
        assert_eq!(patch.entries().len(), 4);
        assert!(patch.entries().iter().all(|(_, value)| value.is_none()));
        assert_eq!(StyleProp::MinHeight.to_string(), "min-height");
    }
}
