//! Presentation store: canvas and window registries plus the id counters.
//!
//! The store is the only long-lived mutable state of the engine. It never holds element handles;
//! elements are looked up by their id attributes on demand, so a record whose element was
//! re-rendered resolves to the new element and a record whose element vanished is a stale
//! reference rather than a dangling pointer.

use std::collections::BTreeMap;

use platform_host::{
    ElementTree, Rect, StylePatch, StyleProp, CANVAS_ID_ATTR, PLACEHOLDER_FOR_ATTR,
    WINDOW_ID_ATTR, WINDOW_STATE_ATTR,
};
use serde::Serialize;
use tracing::debug;

use crate::config::BoundsConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{CanvasId, CanvasRecord, WindowGesture, WindowId, WindowRecord};
use crate::window_manager::clamp_origin;

/// Outcome of a [`PresentationStore::rescan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RescanReport {
    /// Canvases registered after the scan.
    pub canvases: usize,
    /// Windows registered by this scan.
    pub windows_added: Vec<WindowId>,
    /// Records dropped because their element left the tree.
    pub windows_dropped: Vec<WindowId>,
}

/// Serializable view of every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    /// Canvas records in id order.
    pub canvases: Vec<CanvasRecord>,
    /// Window records in id order.
    pub windows: Vec<WindowRecord>,
}

/// Canvas and window registries for one engine.
#[derive(Debug, Clone, Default)]
pub struct PresentationStore {
    next_canvas_id: u32,
    next_window_id: u32,
    canvases: BTreeMap<CanvasId, CanvasRecord>,
    windows: BTreeMap<WindowId, WindowRecord>,
}

impl PresentationStore {
    /// Empty store; the first ids handed out are `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` as a canvas and pairs each of its placeholders with a window.
    ///
    /// Ids already present on elements are reused, so registering twice is harmless and pairing
    /// survives float/dock cycles and re-renders that keep the attributes.
    pub fn register_canvas<T: ElementTree>(&mut self, tree: &mut T, node: &T::Node) -> CanvasId {
        self.register_canvas_inner(tree, node).0
    }

    fn register_canvas_inner<T: ElementTree>(
        &mut self,
        tree: &mut T,
        node: &T::Node,
    ) -> (CanvasId, Vec<WindowId>) {
        let canvas_id = match tree
            .attr(node, CANVAS_ID_ATTR)
            .and_then(|raw| CanvasId::parse_attr(&raw))
        {
            Some(id) => {
                self.next_canvas_id = self.next_canvas_id.max(id.0);
                id
            }
            None => {
                self.next_canvas_id += 1;
                let id = CanvasId(self.next_canvas_id);
                tree.set_attr(node, CANVAS_ID_ATTR, &id.to_string());
                id
            }
        };
        let canvas_rect = tree.rect(node);

        let mut added = Vec::new();
        let mut ordered = Vec::new();
        for (index, placeholder) in tree.placeholders(node).into_iter().enumerate() {
            let paired = tree
                .attr(&placeholder, PLACEHOLDER_FOR_ATTR)
                .and_then(|raw| tree.find_by_attr(WINDOW_ID_ATTR, &raw))
                .or_else(|| tree.window_in(&placeholder));
            let Some(window) = paired else {
                debug!(canvas = %canvas_id, index, "placeholder has no window; skipping");
                continue;
            };

            let window_id = match tree
                .attr(&window, WINDOW_ID_ATTR)
                .and_then(|raw| WindowId::parse_attr(&raw))
            {
                Some(id) => {
                    self.next_window_id = self.next_window_id.max(id.0);
                    id
                }
                None => {
                    self.next_window_id += 1;
                    let id = WindowId(self.next_window_id);
                    tree.set_attr(&window, WINDOW_ID_ATTR, &id.to_string());
                    id
                }
            };
            tree.set_attr(&placeholder, PLACEHOLDER_FOR_ATTR, &window_id.to_string());
            if tree.attr(&window, WINDOW_STATE_ATTR).is_none() {
                tree.set_attr(&window, WINDOW_STATE_ATTR, WindowGesture::Settled.attr_value());
            }

            let record = self.windows.entry(window_id).or_insert_with(|| {
                added.push(window_id);
                WindowRecord::new(window_id, canvas_id, index)
            });
            record.canvas = canvas_id;
            record.index = index;
            if !record.floated && !record.drag_locked {
                if let (Some(canvas_rect), Some(slot), Some(window_rect)) = (
                    canvas_rect,
                    tree.rect(&placeholder),
                    tree.rect(&window),
                ) {
                    record.base = Rect::new(
                        slot.x - canvas_rect.x,
                        slot.y - canvas_rect.y,
                        window_rect.w,
                        window_rect.h,
                    );
                }
            }
            ordered.push(window_id);
        }

        let canvas = self
            .canvases
            .entry(canvas_id)
            .or_insert_with(|| CanvasRecord::new(canvas_id));
        if let Some(rect) = canvas_rect {
            canvas.size = rect.size();
        }
        canvas.windows = ordered;
        (canvas_id, added)
    }

    /// Registers every canvas in the tree and drops records whose elements are gone.
    pub fn rescan<T: ElementTree>(&mut self, tree: &mut T) -> RescanReport {
        let mut report = RescanReport::default();
        for canvas in tree.canvases() {
            let (_, added) = self.register_canvas_inner(tree, &canvas);
            report.canvases += 1;
            report.windows_added.extend(added);
        }

        let stale_canvases: Vec<CanvasId> = self
            .canvases
            .keys()
            .copied()
            .filter(|id| tree.find_by_attr(CANVAS_ID_ATTR, &id.to_string()).is_none())
            .collect();
        for id in stale_canvases {
            debug!(canvas = %id, "dropping stale canvas");
            self.canvases.remove(&id);
        }

        let stale_windows: Vec<WindowId> = self
            .windows
            .values()
            .filter(|record| {
                !self.canvases.contains_key(&record.canvas)
                    || tree
                        .find_by_attr(WINDOW_ID_ATTR, &record.id.to_string())
                        .is_none()
            })
            .map(|record| record.id)
            .collect();
        for id in &stale_windows {
            debug!(window = %id, "dropping stale window");
            self.windows.remove(id);
        }
        for canvas in self.canvases.values_mut() {
            canvas.windows.retain(|id| !stale_windows.contains(id));
        }
        report.windows_dropped = stale_windows;
        report
    }

    /// Copies every record into a [`StoreSnapshot`].
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            canvases: self.canvases.values().cloned().collect(),
            windows: self.windows.values().cloned().collect(),
        }
    }

    /// Canvas record by id.
    pub fn canvas(&self, id: CanvasId) -> Option<&CanvasRecord> {
        self.canvases.get(&id)
    }

    /// Mutable canvas record by id.
    pub fn canvas_mut(&mut self, id: CanvasId) -> Option<&mut CanvasRecord> {
        self.canvases.get_mut(&id)
    }

    /// Registered canvas ids in ascending order.
    pub fn canvas_ids(&self) -> Vec<CanvasId> {
        self.canvases.keys().copied().collect()
    }

    /// Window record by id.
    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    /// Mutable window record by id.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&id)
    }

    /// Every window record in id order.
    pub fn windows(&self) -> impl Iterator<Item = &WindowRecord> {
        self.windows.values()
    }

    /// Window ids of `canvas` in placeholder order.
    pub fn windows_of(&self, canvas: CanvasId) -> Vec<WindowId> {
        self.canvases
            .get(&canvas)
            .map(|record| record.windows.clone())
            .unwrap_or_default()
    }

    /// Highest z-index among visible windows, `0` when there are none.
    pub fn max_visible_z(&self) -> i32 {
        self.windows
            .values()
            .filter(|record| !record.hidden)
            .map(|record| record.z_index)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Resolves the canvas element through its id attribute.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CanvasNotFound`] when the element is gone.
    pub fn canvas_node<T: ElementTree>(&self, tree: &T, id: CanvasId) -> EngineResult<T::Node> {
        tree.find_by_attr(CANVAS_ID_ATTR, &id.to_string())
            .ok_or(EngineError::CanvasNotFound(id))
    }

    /// Resolves the window element through its id attribute.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::WindowNotFound`] when the element is gone.
    pub fn window_node<T: ElementTree>(&self, tree: &T, id: WindowId) -> EngineResult<T::Node> {
        tree.find_by_attr(WINDOW_ID_ATTR, &id.to_string())
            .ok_or(EngineError::WindowNotFound(id))
    }

    /// Resolves the placeholder paired with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PlaceholderMissing`] when the element is gone.
    pub fn placeholder_node<T: ElementTree>(
        &self,
        tree: &T,
        id: WindowId,
    ) -> EngineResult<T::Node> {
        tree.find_by_attr(PLACEHOLDER_FOR_ATTR, &id.to_string())
            .ok_or(EngineError::PlaceholderMissing(id))
    }

    /// Inline style for a floated window's current presentation.
    ///
    /// Pinned geometry wins over scatter. Without a scatter plan the base origin is clamped to
    /// the canvas plus overflow margins.
    pub fn presentation_patch(&self, id: WindowId, bounds: &BoundsConfig) -> EngineResult<StylePatch> {
        let record = self.window(id).ok_or(EngineError::WindowNotFound(id))?;
        let canvas_size = self
            .canvas(record.canvas)
            .map(|canvas| canvas.size)
            .ok_or(EngineError::CanvasNotFound(record.canvas))?;
        let patch = StylePatch::new().set(StyleProp::Position, "absolute");

        let patch = match (record.pinned, record.scatter) {
            (Some(pinned), _) => patch
                .px(StyleProp::Left, pinned.left)
                .px(StyleProp::Top, pinned.top)
                .px(StyleProp::Width, pinned.width)
                .px(StyleProp::Height, pinned.height)
                .clear(StyleProp::Transform),
            (None, Some(plan)) => patch
                .px(StyleProp::Left, record.base.x)
                .px(StyleProp::Top, record.base.y)
                .px(StyleProp::Width, plan.width)
                .px(StyleProp::Height, record.base.h)
                .set(
                    StyleProp::Transform,
                    format!(
                        "translate({}px, {}px)",
                        round2(plan.translate_x),
                        round2(plan.translate_y)
                    ),
                ),
            (None, None) => {
                let origin = clamp_origin(
                    record.base.origin(),
                    record.base.size(),
                    canvas_size,
                    bounds,
                );
                patch
                    .px(StyleProp::Left, origin.x)
                    .px(StyleProp::Top, origin.y)
                    .px(StyleProp::Width, record.base.w)
                    .px(StyleProp::Height, record.base.h)
                    .clear(StyleProp::Transform)
            }
        };

        Ok(patch.set(StyleProp::ZIndex, record.z_index.to_string()))
    }

    /// Writes the presentation of a floated window. Docked windows are left alone.
    pub fn apply_presentation<T: ElementTree>(
        &self,
        tree: &mut T,
        id: WindowId,
        bounds: &BoundsConfig,
    ) -> EngineResult<()> {
        let record = self.window(id).ok_or(EngineError::WindowNotFound(id))?;
        if !record.floated {
            return Ok(());
        }
        let node = self.window_node(tree, id)?;
        let patch = self.presentation_patch(id, bounds)?;
        tree.apply_style(&node, &patch);
        Ok(())
    }

    /// Removes the presentation overrides from the element. The record keeps its plan and pins.
    pub fn clear_presentation<T: ElementTree>(&self, tree: &mut T, id: WindowId) -> EngineResult<()> {
        let node = self.window_node(tree, id)?;
        tree.apply_style(
            &node,
            &StylePatch::new().clear_all(&StyleProp::WINDOW_OVERRIDES),
        );
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
