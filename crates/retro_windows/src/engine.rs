//! Engine facade: the programmatic triggers exposed to the surrounding application.
//!
//! Host adapters own one [`PresentationEngine`] and one element tree and route lifecycle hooks
//! and pointer events here. Canvas-wide operations return the per-window failures they skipped
//! so callers can log them; nothing here aborts half-way through a canvas.

use platform_host::{entropy_seed, ElementTree};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::layer;
use crate::model::{CanvasId, GridScope, InteractionState, WindowId};
use crate::reducer::{reduce_window, InteractionEffect, WindowAction};
use crate::scatter::{plan_window, splitmix32, ScatterMode, ScatterRng};
use crate::store::{PresentationStore, RescanReport, StoreSnapshot};

/// Owns the store, the configuration and the active gesture for one page.
#[derive(Debug, Clone)]
pub struct PresentationEngine {
    config: EngineConfig,
    store: PresentationStore,
    interaction: InteractionState,
    scatter_calls: u32,
}

impl PresentationEngine {
    /// Validates `config` and creates an engine with an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when `config` fails validation.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        if let Err(err) = config.validate() {
            warn!(%err, "rejecting engine configuration");
            return Err(err);
        }
        Ok(Self {
            config,
            store: PresentationStore::new(),
            interaction: InteractionState::default(),
            scatter_calls: 0,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the canvas and window records.
    pub fn store(&self) -> &PresentationStore {
        &self.store
    }

    /// Drag or resize in progress, if any.
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// Serializable copy of the store.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// First scan after mount: registers everything, then floats and scatters per config.
    pub fn mount<T: ElementTree>(&mut self, tree: &mut T) -> RescanReport {
        let report = self.rescan(tree);
        if self.config.scatter.enabled_on_load {
            for canvas_id in self.store.canvas_ids() {
                let pending: Vec<WindowId> = self
                    .store
                    .windows_of(canvas_id)
                    .into_iter()
                    .filter(|id| {
                        self.store
                            .window(*id)
                            .is_some_and(|record| record.scatter.is_none())
                    })
                    .collect();
                let errors = self.scatter_windows(tree, canvas_id, &pending);
                self.log_skipped(errors);
            }
        }
        report
    }

    /// Explicit "content changed" hook. Registers new canvases and windows, drops stale ones,
    /// and floats newcomers into non-grid canvases when floating on load is enabled.
    pub fn rescan<T: ElementTree>(&mut self, tree: &mut T) -> RescanReport {
        let report = self.store.rescan(tree);
        if self.config.layer.float_on_load {
            for canvas_id in self.store.canvas_ids() {
                if self.in_grid_mode(canvas_id) {
                    continue;
                }
                let errors =
                    layer::float_canvas(&mut self.store, tree, &self.config.bounds, canvas_id);
                self.log_skipped(errors);
            }
        }
        report
    }

    /// Recomputes scatter for every window of every non-grid canvas and clears user pins.
    pub fn rescatter_all<T: ElementTree>(&mut self, tree: &mut T) -> Vec<EngineError> {
        let mut errors = Vec::new();
        for canvas_id in self.store.canvas_ids() {
            if self.in_grid_mode(canvas_id) {
                continue;
            }
            let windows = self.store.windows_of(canvas_id);
            errors.extend(self.scatter_windows(tree, canvas_id, &windows));
        }
        self.log_skipped(errors.clone());
        errors
    }

    /// Grid mode on docks every window of the scope; off re-floats them and restores the cached
    /// scatter, computing it first when none exists and scatter is enabled.
    pub fn set_grid_mode<T: ElementTree>(
        &mut self,
        tree: &mut T,
        scope: GridScope,
        on: bool,
    ) -> Vec<EngineError> {
        let mut errors = Vec::new();
        let canvases: Vec<CanvasId> = self
            .store
            .canvas_ids()
            .into_iter()
            .filter(|id| scope.includes(*id))
            .collect();
        if let GridScope::Canvas(id) = scope {
            if canvases.is_empty() {
                errors.push(EngineError::CanvasNotFound(id));
            }
        }

        for canvas_id in canvases {
            if let Some(canvas) = self.store.canvas_mut(canvas_id) {
                canvas.grid_mode = on;
            }
            if on {
                for window_id in self.store.windows_of(canvas_id) {
                    if let Some(record) = self.store.window_mut(window_id) {
                        if !record.drag_locked {
                            record.pinned = None;
                        }
                    }
                }
                errors.extend(layer::dock_canvas(&mut self.store, tree, canvas_id));
                continue;
            }

            errors.extend(layer::float_canvas(
                &mut self.store,
                tree,
                &self.config.bounds,
                canvas_id,
            ));
            if self.config.scatter.enabled_on_load {
                let unplanned: Vec<WindowId> = self
                    .store
                    .windows_of(canvas_id)
                    .into_iter()
                    .filter(|id| {
                        self.store
                            .window(*id)
                            .is_some_and(|record| record.scatter.is_none())
                    })
                    .collect();
                errors.extend(self.scatter_windows(tree, canvas_id, &unplanned));
            }
        }
        self.log_skipped(errors.clone());
        errors
    }

    /// Moves one window into its canvas overlay at its current position.
    ///
    /// # Errors
    ///
    /// Returns the stale-reference or measurement error for that window.
    pub fn float_window<T: ElementTree>(&mut self, tree: &mut T, window_id: WindowId) -> EngineResult<()> {
        layer::float_window(&mut self.store, tree, &self.config.bounds, window_id)
    }

    /// Returns one window to its placeholder and clears its presentation styles.
    ///
    /// # Errors
    ///
    /// Returns the stale-reference error for that window or its placeholder.
    pub fn dock_window<T: ElementTree>(&mut self, tree: &mut T, window_id: WindowId) -> EngineResult<()> {
        layer::dock_window(&mut self.store, tree, window_id)
    }

    /// Viewport resized: glue floated windows to their placeholders' new positions.
    pub fn reflow<T: ElementTree>(&mut self, tree: &mut T) -> Vec<EngineError> {
        let mut errors = Vec::new();
        for canvas_id in self.store.canvas_ids() {
            errors.extend(layer::reflow_canvas(
                &mut self.store,
                tree,
                &self.config.bounds,
                canvas_id,
            ));
        }
        errors
    }

    /// Runs one pointer-driven action and returns the effects the host must apply.
    ///
    /// # Errors
    ///
    /// Returns the stale-reference or measurement error that stopped the action.
    pub fn dispatch<T: ElementTree>(
        &mut self,
        tree: &mut T,
        action: WindowAction,
    ) -> EngineResult<Vec<InteractionEffect>> {
        reduce_window(
            &mut self.store,
            &mut self.interaction,
            tree,
            &self.config,
            action,
        )
    }

    fn in_grid_mode(&self, canvas_id: CanvasId) -> bool {
        self.store
            .canvas(canvas_id)
            .is_some_and(|canvas| canvas.grid_mode)
    }

    /// Plans, stores and applies scatter for `windows`, floating them first when needed.
    fn scatter_windows<T: ElementTree>(
        &mut self,
        tree: &mut T,
        canvas_id: CanvasId,
        windows: &[WindowId],
    ) -> Vec<EngineError> {
        let mode = self.config.scatter.mode();
        let mut random = match mode {
            ScatterMode::Random => {
                self.scatter_calls = self.scatter_calls.wrapping_add(1);
                Some(ScatterRng::new(
                    entropy_seed() ^ splitmix32(self.scatter_calls),
                ))
            }
            ScatterMode::Seeded(_) => None,
        };

        let mut errors = Vec::new();
        for window_id in windows {
            let Some(record) = self.store.window(*window_id) else {
                errors.push(EngineError::WindowNotFound(*window_id));
                continue;
            };
            if record.drag_locked {
                continue;
            }
            let floated = record.floated;
            let index = record.index;
            if !floated {
                if let Err(err) =
                    layer::float_window(&mut self.store, tree, &self.config.bounds, *window_id)
                {
                    errors.push(err);
                    continue;
                }
            }
            let Some(record) = self.store.window(*window_id) else {
                continue;
            };
            let canvas_size = self
                .store
                .canvas(canvas_id)
                .map(|canvas| canvas.size)
                .unwrap_or_default();
            let plan = match (&mode, random.as_mut()) {
                (ScatterMode::Seeded(seed), _) => plan_window(
                    &mut ScatterRng::seeded(seed, canvas_id, *window_id, index),
                    record.base,
                    canvas_size,
                    &self.config.scatter,
                    &self.config.bounds,
                ),
                (ScatterMode::Random, Some(rng)) => plan_window(
                    rng,
                    record.base,
                    canvas_size,
                    &self.config.scatter,
                    &self.config.bounds,
                ),
                (ScatterMode::Random, None) => continue,
            };
            if let Some(record) = self.store.window_mut(*window_id) {
                record.scatter = Some(plan);
                record.pinned = None;
                record.z_index = plan.z_index;
            }
            if let Err(err) = self
                .store
                .apply_presentation(tree, *window_id, &self.config.bounds)
            {
                errors.push(err);
            }
        }
        errors
    }

    fn log_skipped(&self, errors: Vec<EngineError>) {
        for err in errors {
            debug!(%err, "presentation pass skipped a window");
        }
    }
}
