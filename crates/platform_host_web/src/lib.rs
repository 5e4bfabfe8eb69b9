//! Browser (`wasm32`) implementations of the [`platform_host`] contracts and the process-wide
//! retro window runtime.
//!
//! The crate is split the same way on every target:
//! - [`gesture`] maps pointer/click targets to [`retro_windows::WindowAction`] values (pure, host
//!   testable)
//! - [`runtime`] owns the single engine instance, its document listeners, the intersection and
//!   resize observers and the per-image pixelation drivers
//! - [`visibility`] remembers which pixelation roots have been on screen (pure)
//! - [`logging`] routes `tracing` events to the browser console
//! - `dom_tree`, `surface` and `timer` adapt `web-sys` to `ElementTree`, `PixelSurface` and
//!   `TimerHost` (wasm only)
//! - `script` exposes the runtime to plain `<script type="module">` pages (wasm only, behind the
//!   `script-exports` feature)
//!
//! On non-wasm targets the runtime entry points return an "unsupported" error so the workspace
//! still builds and tests on the host.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

#[cfg(target_arch = "wasm32")]
mod dom_tree;
pub mod gesture;
pub mod logging;
pub mod runtime;
#[cfg(all(target_arch = "wasm32", feature = "script-exports"))]
mod script;
#[cfg(target_arch = "wasm32")]
mod surface;
#[cfg(target_arch = "wasm32")]
mod timer;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
pub use dom_tree::DomElementTree;
pub use gesture::{click_action, pointer_action, PointerPhase, PointerTarget};
pub use logging::init_console_logging;
pub use runtime::{
    attach, config_from_document, detach, dock_window, float_window, is_attached, parse_config,
    rescan, rescatter, set_grid_mode, snapshot, CONFIG_SCRIPT_ID,
};
#[cfg(target_arch = "wasm32")]
pub use surface::CanvasPixelSurface;
#[cfg(target_arch = "wasm32")]
pub use timer::WebTimerHost;
pub use visibility::SeenRoots;
