//! Plain-script adapter: the runtime exported to pages that load the wasm module directly.
//!
//! The module installs the console logger and attaches itself on start using the page's config
//! block. The exported functions are the programmatic triggers for code outside Rust.

use retro_windows::{GridScope, WindowId};
use wasm_bindgen::prelude::*;

use crate::{logging, runtime};

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

#[wasm_bindgen(start)]
fn start() {
    logging::init_console_logging();
    let attached = runtime::config_from_document().and_then(runtime::attach);
    if let Err(err) = attached {
        tracing::warn!(%err, "retro windows attach failed");
    }
}

/// Attaches with an explicit JSON config, replacing whatever `start` installed.
#[wasm_bindgen(js_name = attachRetroWindows)]
pub fn attach_retro_windows(config_json: Option<String>) -> Result<(), JsValue> {
    let config = runtime::parse_config(config_json.as_deref()).map_err(js_error)?;
    runtime::detach();
    runtime::attach(config).map_err(js_error)
}

/// Tears the runtime down.
#[wasm_bindgen(js_name = detachRetroWindows)]
pub fn detach_retro_windows() {
    runtime::detach();
}

/// Picks up canvases, windows and images added since the last scan.
#[wasm_bindgen(js_name = rescanRetroWindows)]
pub fn rescan_retro_windows() -> Result<JsValue, JsValue> {
    let report = runtime::rescan().map_err(js_error)?;
    serde_wasm_bindgen::to_value(&report).map_err(|err| js_error(err.to_string()))
}

/// Forces a fresh scatter of every window outside grid mode.
#[wasm_bindgen(js_name = rescatterWindows)]
pub fn rescatter_windows() -> Result<(), JsValue> {
    runtime::rescatter().map_err(js_error)
}

/// Toggles grid mode for one canvas, or for all canvases when `canvas_id` is omitted.
#[wasm_bindgen(js_name = setGridMode)]
pub fn set_grid_mode(on: bool, canvas_id: Option<u32>) -> Result<(), JsValue> {
    let scope = canvas_id
        .map(|id| GridScope::Canvas(retro_windows::CanvasId(id)))
        .unwrap_or(GridScope::All);
    runtime::set_grid_mode(scope, on).map_err(js_error)
}

/// Moves a window into its canvas overlay.
#[wasm_bindgen(js_name = floatWindow)]
pub fn float_window(window_id: u32) -> Result<(), JsValue> {
    runtime::float_window(WindowId(window_id)).map_err(js_error)
}

/// Returns a window to its placeholder.
#[wasm_bindgen(js_name = dockWindow)]
pub fn dock_window(window_id: u32) -> Result<(), JsValue> {
    runtime::dock_window(WindowId(window_id)).map_err(js_error)
}

/// Current canvases and windows as a plain object.
#[wasm_bindgen(js_name = retroWindowsSnapshot)]
pub fn retro_windows_snapshot() -> Result<JsValue, JsValue> {
    let snapshot = runtime::snapshot().map_err(js_error)?;
    serde_wasm_bindgen::to_value(&snapshot).map_err(|err| js_error(err.to_string()))
}
