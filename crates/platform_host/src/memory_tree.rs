//! In-memory [`ElementTree`] used by engine tests and non-browser hosts.
//!
//! Layout is deliberately simple: a node either carries an explicit layout rectangle (canvases
//! and placeholders set by the test), or it is absolutely positioned through inline
//! `left`/`top` and sized by inline `width`/`height` or its intrinsic content size, or it fills
//! its parent. That is enough to model windows resting in placeholders, overlay layers anchored
//! at a canvas origin, and floated windows.

use std::collections::BTreeMap;

use crate::dom::{
    ElementTree, StylePatch, StyleProp, CANVAS_MARKER_ATTR, OVERLAY_MARKER_ATTR,
    PLACEHOLDER_MARKER_ATTR, WINDOW_MARKER_ATTR,
};
use crate::geometry::{Rect, Size};

/// Handle to a node in a [`MemoryElementTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryNode(pub usize);

#[derive(Debug, Clone, Default)]
struct NodeData {
    parent: Option<usize>,
    children: Vec<usize>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<StyleProp, String>,
    layout: Option<Rect>,
    intrinsic: Option<Size>,
}

/// Arena-backed element tree with a single root standing in for the document body.
#[derive(Debug, Clone)]
pub struct MemoryElementTree {
    nodes: Vec<NodeData>,
}

impl Default for MemoryElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryElementTree {
    const ROOT: usize = 0;

    /// Tree holding only the root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::default()],
        }
    }

    /// Document root.
    pub fn root(&self) -> MemoryNode {
        MemoryNode(Self::ROOT)
    }

    /// Appends a new element under `parent` with the given marker attributes.
    pub fn add_element(&mut self, parent: MemoryNode, attrs: &[(&str, &str)]) -> MemoryNode {
        let id = self.nodes.len();
        let mut data = NodeData {
            parent: Some(parent.0),
            ..NodeData::default()
        };
        for (name, value) in attrs {
            data.attrs.insert((*name).to_string(), (*value).to_string());
        }
        self.nodes.push(data);
        self.nodes[parent.0].children.push(id);
        MemoryNode(id)
    }

    /// Adds a canvas under the root with a fixed client rectangle.
    pub fn add_canvas(&mut self, rect: Rect) -> MemoryNode {
        let canvas = self.add_element(self.root(), &[(CANVAS_MARKER_ATTR, "")]);
        self.set_layout(canvas, rect);
        canvas
    }

    /// Adds a placeholder laid out at `rect` (client coordinates) holding one window.
    pub fn add_window_slot(&mut self, canvas: MemoryNode, rect: Rect) -> (MemoryNode, MemoryNode) {
        let placeholder = self.add_element(canvas, &[(PLACEHOLDER_MARKER_ATTR, "")]);
        self.set_layout(placeholder, rect);
        let window = self.add_element(placeholder, &[(WINDOW_MARKER_ATTR, "")]);
        self.nodes[window.0].intrinsic = Some(rect.size());
        (placeholder, window)
    }

    /// Moves a node to a new layout rectangle, as a grid reflow would.
    pub fn set_layout(&mut self, node: MemoryNode, rect: Rect) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.layout = Some(rect);
        }
    }

    /// Detaches `node` from its parent, as a re-render that drops the element would.
    pub fn remove(&mut self, node: MemoryNode) {
        let Some(parent) = self.nodes.get(node.0).and_then(|data| data.parent) else {
            return;
        };
        self.nodes[parent].children.retain(|child| *child != node.0);
        self.nodes[node.0].parent = None;
    }

    /// Parent of `node`; `None` for the root and detached nodes.
    pub fn parent(&self, node: MemoryNode) -> Option<MemoryNode> {
        self.nodes.get(node.0)?.parent.map(MemoryNode)
    }

    /// Children of `node` in document order.
    pub fn children(&self, node: MemoryNode) -> Vec<MemoryNode> {
        self.nodes
            .get(node.0)
            .map(|data| data.children.iter().copied().map(MemoryNode).collect())
            .unwrap_or_default()
    }

    /// All inline styles currently set on `node`.
    pub fn inline_styles(&self, node: MemoryNode) -> BTreeMap<StyleProp, String> {
        self.nodes
            .get(node.0)
            .map(|data| data.styles.clone())
            .unwrap_or_default()
    }

    fn is_attached(&self, index: usize) -> bool {
        let mut cursor = index;
        loop {
            if cursor == Self::ROOT {
                return true;
            }
            match self.nodes.get(cursor).and_then(|data| data.parent) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[index].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    fn has_attr(&self, index: usize, name: &str) -> bool {
        self.nodes[index].attrs.contains_key(name)
    }

    fn style_px(&self, index: usize, prop: StyleProp) -> Option<f64> {
        self.nodes[index]
            .styles
            .get(&prop)
            .and_then(|value| value.trim_end_matches("px").parse::<f64>().ok())
    }

    fn layout_rect(&self, index: usize) -> Option<Rect> {
        if !self.is_attached(index) {
            return None;
        }
        let data = &self.nodes[index];
        let parent_rect = data.parent.and_then(|parent| self.layout_rect(parent));
        let absolute = data.styles.get(&StyleProp::Position).map(String::as_str) == Some("absolute");

        let mut rect = match (absolute, parent_rect) {
            (true, Some(parent)) => {
                let left = self.style_px(index, StyleProp::Left).unwrap_or(0.0);
                let top = self.style_px(index, StyleProp::Top).unwrap_or(0.0);
                let size = data
                    .intrinsic
                    .or(data.layout.map(Rect::size))
                    .unwrap_or(parent.size());
                Rect::new(parent.x + left, parent.y + top, size.w, size.h)
            }
            _ => data.layout.or(parent_rect)?,
        };
        if let Some(width) = self.style_px(index, StyleProp::Width) {
            rect.w = width;
        }
        if let Some(height) = self.style_px(index, StyleProp::Height) {
            rect.h = height;
        }
        Some(rect)
    }
}

impl ElementTree for MemoryElementTree {
    type Node = MemoryNode;

    fn canvases(&self) -> Vec<MemoryNode> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|index| self.has_attr(*index, CANVAS_MARKER_ATTR))
            .map(MemoryNode)
            .collect()
    }

    fn placeholders(&self, canvas: &MemoryNode) -> Vec<MemoryNode> {
        if canvas.0 >= self.nodes.len() {
            return Vec::new();
        }
        self.descendants(canvas.0)
            .into_iter()
            .filter(|index| self.has_attr(*index, PLACEHOLDER_MARKER_ATTR))
            .map(MemoryNode)
            .collect()
    }

    fn window_in(&self, placeholder: &MemoryNode) -> Option<MemoryNode> {
        self.nodes
            .get(placeholder.0)?
            .children
            .iter()
            .copied()
            .find(|child| self.has_attr(*child, WINDOW_MARKER_ATTR))
            .map(MemoryNode)
    }

    fn find_by_attr(&self, name: &str, value: &str) -> Option<MemoryNode> {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|index| self.nodes[*index].attrs.get(name).map(String::as_str) == Some(value))
            .map(MemoryNode)
    }

    fn attr(&self, node: &MemoryNode, name: &str) -> Option<String> {
        self.nodes.get(node.0)?.attrs.get(name).cloned()
    }

    fn set_attr(&mut self, node: &MemoryNode, name: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attr(&mut self, node: &MemoryNode, name: &str) {
        if let Some(data) = self.nodes.get_mut(node.0) {
            data.attrs.remove(name);
        }
    }

    fn rect(&self, node: &MemoryNode) -> Option<Rect> {
        if node.0 >= self.nodes.len() {
            return None;
        }
        self.layout_rect(node.0)
    }

    fn overlay_of(&mut self, canvas: &MemoryNode) -> Option<MemoryNode> {
        if !self.nodes.get(canvas.0).is_some_and(|_| self.is_attached(canvas.0)) {
            return None;
        }
        let existing = self.nodes[canvas.0]
            .children
            .iter()
            .copied()
            .find(|child| self.has_attr(*child, OVERLAY_MARKER_ATTR));
        Some(match existing {
            Some(index) => MemoryNode(index),
            None => self.add_element(*canvas, &[(OVERLAY_MARKER_ATTR, "")]),
        })
    }

    fn append_child(&mut self, parent: &MemoryNode, child: &MemoryNode) -> bool {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return false;
        }
        self.remove(*child);
        self.nodes[parent.0].children.push(child.0);
        self.nodes[child.0].parent = Some(parent.0);
        true
    }

    fn is_child_of(&self, parent: &MemoryNode, child: &MemoryNode) -> bool {
        self.nodes.get(child.0).and_then(|data| data.parent) == Some(parent.0)
    }

    fn apply_style(&mut self, node: &MemoryNode, patch: &StylePatch) {
        let Some(data) = self.nodes.get_mut(node.0) else {
            return;
        };
        for (prop, value) in patch.entries() {
            match value {
                Some(value) => {
                    data.styles.insert(*prop, value.clone());
                }
                None => {
                    data.styles.remove(prop);
                }
            }
        }
    }

    fn inline_style(&self, node: &MemoryNode, prop: StyleProp) -> Option<String> {
        self.nodes.get(node.0)?.styles.get(&prop).cloned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn windows_fill_their_placeholder_until_positioned() {
        let mut tree = MemoryElementTree::new();
        let canvas = tree.add_canvas(Rect::new(10.0, 20.0, 1000.0, 800.0));
        let (placeholder, window) =
            tree.add_window_slot(canvas, Rect::new(60.0, 70.0, 300.0, 200.0));

        assert_eq!(tree.window_in(&placeholder), Some(window));
        assert_eq!(tree.rect(&window), Some(Rect::new(60.0, 70.0, 300.0, 200.0)));

        let overlay = tree.overlay_of(&canvas).expect("overlay");
        assert!(tree.append_child(&overlay, &window));
        tree.apply_style(
            &window,
            &StylePatch::new()
                .set(StyleProp::Position, "absolute")
                .px(StyleProp::Left, -5.0)
                .px(StyleProp::Top, 15.0)
                .px(StyleProp::Width, 280.0),
        );

        assert_eq!(tree.window_in(&placeholder), None);
        assert_eq!(tree.rect(&window), Some(Rect::new(5.0, 35.0, 280.0, 200.0)));
        assert_eq!(tree.overlay_of(&canvas), Some(overlay));
    }

    #[test]
    fn removed_nodes_are_unmeasurable_and_unfindable() {
        let mut tree = MemoryElementTree::new();
        let canvas = tree.add_canvas(Rect::new(0.0, 0.0, 400.0, 400.0));
        let (_, window) = tree.add_window_slot(canvas, Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.set_attr(&window, "data-window-id", "7");

        assert_eq!(tree.find_by_attr("data-window-id", "7"), Some(window));
        tree.remove(window);
        assert_eq!(tree.find_by_attr("data-window-id", "7"), None);
        assert_eq!(tree.rect(&window), None);
    }
}
