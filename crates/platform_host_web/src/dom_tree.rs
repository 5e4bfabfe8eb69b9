//! `web-sys` implementation of [`ElementTree`].

use platform_host::{
    ElementTree, Rect, StylePatch, StyleProp, CANVAS_MARKER_ATTR, OVERLAY_MARKER_ATTR,
    PLACEHOLDER_MARKER_ATTR, WINDOW_MARKER_ATTR,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

const OVERLAY_STYLE: &str =
    "position:absolute;left:0;top:0;width:0;height:0;overflow:visible;z-index:1";

/// Live document adapter. Holds no state beyond the document handle.
#[derive(Debug, Clone)]
pub struct DomElementTree {
    document: Document,
}

impl DomElementTree {
    /// Wraps the current window's document.
    ///
    /// # Errors
    ///
    /// Returns an error when no window or document is available.
    pub fn from_window() -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| "document unavailable".to_string())?;
        Ok(Self { document })
    }

    /// Underlying document handle.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn select_all(&self, root: Option<&Element>, selector: &str) -> Vec<Element> {
        let list = match root {
            Some(root) => root.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        let Ok(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn child_with_attr(&self, parent: &Element, name: &str) -> Option<Element> {
        let children = parent.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .find(|child| child.has_attribute(name))
    }
}

fn marker(name: &str) -> String {
    format!("[{name}]")
}

impl ElementTree for DomElementTree {
    type Node = Element;

    fn canvases(&self) -> Vec<Element> {
        self.select_all(None, &marker(CANVAS_MARKER_ATTR))
    }

    fn placeholders(&self, canvas: &Element) -> Vec<Element> {
        self.select_all(Some(canvas), &marker(PLACEHOLDER_MARKER_ATTR))
    }

    fn window_in(&self, placeholder: &Element) -> Option<Element> {
        self.child_with_attr(placeholder, WINDOW_MARKER_ATTR)
    }

    fn find_by_attr(&self, name: &str, value: &str) -> Option<Element> {
        self.document
            .query_selector(&format!("[{name}=\"{value}\"]"))
            .ok()
            .flatten()
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attr(&mut self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attr(&mut self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn rect(&self, node: &Element) -> Option<Rect> {
        if !node.is_connected() {
            return None;
        }
        let rect = node.get_bounding_client_rect();
        Some(Rect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn overlay_of(&mut self, canvas: &Element) -> Option<Element> {
        if let Some(existing) = self.child_with_attr(canvas, OVERLAY_MARKER_ATTR) {
            return Some(existing);
        }
        let overlay = self.document.create_element("div").ok()?;
        overlay.set_attribute(OVERLAY_MARKER_ATTR, "").ok()?;
        overlay.set_attribute("style", OVERLAY_STYLE).ok()?;
        canvas.append_child(&overlay).ok()?;
        Some(overlay)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> bool {
        parent.append_child(child).is_ok()
    }

    fn is_child_of(&self, parent: &Element, child: &Element) -> bool {
        child
            .parent_element()
            .is_some_and(|actual| actual.is_same_node(Some(AsRef::<Node>::as_ref(parent))))
    }

    fn apply_style(&mut self, node: &Element, patch: &StylePatch) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        for (prop, value) in patch.entries() {
            let _ = match value {
                Some(value) => style.set_property(prop.css_name(), value),
                None => style.remove_property(prop.css_name()).map(|_| ()),
            };
        }
    }

    fn inline_style(&self, node: &Element, prop: StyleProp) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        element
            .style()
            .get_property_value(prop.css_name())
            .ok()
            .filter(|value| !value.is_empty())
    }
}
