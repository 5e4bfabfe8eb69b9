//! Retro window presentation engine.
//!
//! Draggable windows over a canvas grid, a float/dock overlay layer, seeded or random scatter,
//! and a pixelation reveal for images. Everything here runs against the
//! [`platform_host::ElementTree`], [`platform_host::PixelSurface`] and
//! [`platform_host::TimerHost`] contracts, so the same logic drives the browser adapter and the
//! in-memory test doubles.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod layer;
pub mod model;
pub mod pixelate;
pub mod reducer;
pub mod scatter;
pub mod store;
pub mod window_manager;

pub use config::{
    BoundsConfig, DragConfig, EngineConfig, LayerConfig, PixelateConfig, ScatterConfig,
    MAX_PIXELATE_DURATION_MS, MAX_PIXELATE_STEPS,
};
pub use debounce::Debouncer;
pub use engine::PresentationEngine;
pub use error::{EngineError, EngineResult};
pub use model::{
    CanvasId, CanvasRecord, DragSession, GridScope, InteractionState, PinnedGeometry,
    ResizeSession, WindowGesture, WindowId, WindowRecord,
};
pub use pixelate::{PixelationDriver, PixelationSession, PixelationState, PixelationStep};
pub use reducer::{reduce_window, InteractionEffect, WindowAction};
pub use scatter::{ScatterMode, ScatterPlan};
pub use store::{PresentationStore, RescanReport, StoreSnapshot};
