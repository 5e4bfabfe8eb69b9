//! Host contracts shared by the retro window engine and its browser adapters.
//!
//! The engine in `retro_windows` is written against the traits in this crate: [`ElementTree`]
//! for structure, measurement and inline style, [`PixelSurface`] for pixelation drawing, and
//! [`TimerHost`] for one-shot timers. Browser implementations live in `platform_host_web`;
//! the in-memory implementations here back unit tests and non-browser builds.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod dom;
pub mod geometry;
pub mod memory_tree;
pub mod surface;
pub mod time;
pub mod timer;

pub use dom::{
    ElementTree, StylePatch, StyleProp, CANVAS_ID_ATTR, CANVAS_MARKER_ATTR, CLOSE_CONTROL_ATTR,
    DRAG_HANDLE_ATTR, NO_PIXELATE_ATTR, OVERLAY_MARKER_ATTR, PIXELATE_ROOT_ATTR,
    PLACEHOLDER_FOR_ATTR, PLACEHOLDER_MARKER_ATTR, RESIZE_HANDLE_ATTR, WINDOW_ID_ATTR,
    WINDOW_MARKER_ATTR, WINDOW_STATE_ATTR,
};
pub use geometry::{Point, Rect, Size};
pub use memory_tree::{MemoryElementTree, MemoryNode};
pub use surface::{FramePlan, ObjectFit, PixelSurface, RecordingPixelSurface, SurfaceEvent};
pub use time::{entropy_seed, unix_time_ms_now};
pub use timer::{ManualTimerHost, NoopTimerHost, TimerCallback, TimerHost, TimerId};
