//! Process-wide retro window runtime.
//!
//! One engine instance per page, created by [`attach`] and torn down by [`detach`]. While
//! attached the runtime owns the document-level pointer and click listeners, the viewport resize
//! listener feeding the debounced reflow, the intersection observer and every pixelation driver.
//! Calls route to the wasm implementation or to host stubs, in the same shape on every target.

use retro_windows::{EngineConfig, GridScope, RescanReport, StoreSnapshot, WindowId};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

/// Id of the `<script type="application/json">` block holding page-level configuration.
pub const CONFIG_SCRIPT_ID: &str = "retro-windows-config";

/// Parses an optional JSON config block; a missing or blank block means defaults.
///
/// # Errors
///
/// Returns the validation message for malformed JSON or inconsistent ranges.
pub fn parse_config(raw: Option<&str>) -> Result<EngineConfig, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(EngineConfig::default()),
        Some(raw) => EngineConfig::from_json(raw).map_err(|err| err.to_string()),
    }
}

/// Reads the page's [`CONFIG_SCRIPT_ID`] block and parses it with [`parse_config`].
///
/// # Errors
///
/// Returns the validation message for an invalid block.
pub fn config_from_document() -> Result<EngineConfig, String> {
    parse_config(imp::config_script_text().as_deref())
}

/// Scans the document, scatters and floats windows, and installs listeners and observers.
/// Attaching twice rescans instead of installing a second set of listeners.
///
/// # Errors
///
/// Returns an error off the browser, when the document is unavailable, or for an invalid config.
pub fn attach(config: EngineConfig) -> Result<(), String> {
    imp::attach(config)
}

/// Removes listeners, disconnects the observer, cancels pending timers and reveals any image
/// still mid-animation. Safe to call when not attached.
pub fn detach() {
    imp::detach()
}

/// Whether a runtime is currently attached.
pub fn is_attached() -> bool {
    imp::is_attached()
}

/// Re-registers canvases and windows after the page content changed and binds new images.
///
/// # Errors
///
/// Returns an error when no runtime is attached.
pub fn rescan() -> Result<RescanReport, String> {
    imp::rescan()
}

/// Recomputes and applies scatter for every window outside grid mode.
///
/// # Errors
///
/// Returns an error when no runtime is attached.
pub fn rescatter() -> Result<(), String> {
    imp::rescatter()
}

/// Docks (`on`) or re-floats and re-scatters (`!on`) the windows of `scope`.
///
/// # Errors
///
/// Returns an error when no runtime is attached or the scoped canvas is unknown.
pub fn set_grid_mode(scope: GridScope, on: bool) -> Result<(), String> {
    imp::set_grid_mode(scope, on)
}

/// Moves one window into its canvas overlay.
///
/// # Errors
///
/// Returns an error when no runtime is attached or the window cannot be resolved.
pub fn float_window(window_id: WindowId) -> Result<(), String> {
    imp::float_window(window_id)
}

/// Returns one window to its placeholder.
///
/// # Errors
///
/// Returns an error when no runtime is attached or the window cannot be resolved.
pub fn dock_window(window_id: WindowId) -> Result<(), String> {
    imp::dock_window(window_id)
}

/// Serialisable view of the registered canvases and windows.
///
/// # Errors
///
/// Returns an error when no runtime is attached.
pub fn snapshot() -> Result<StoreSnapshot, String> {
    imp::snapshot()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_or_blank_config_blocks_fall_back_to_defaults() {
        assert_eq!(parse_config(None), Ok(EngineConfig::default()));
        assert_eq!(parse_config(Some("  \n ")), Ok(EngineConfig::default()));
    }

    #[test]
    fn config_blocks_are_parsed_and_validated() {
        let config = parse_config(Some(r#"{"scatter":{"seed":"desk"},"drag":{"min_width":240}}"#))
            .expect("valid config");
        assert_eq!(config.scatter.seed.as_deref(), Some("desk"));
        assert_eq!(config.drag.min_width, 240.0);

        let inverted = parse_config(Some(r#"{"scatter":{"min_z":9,"max_z":1}}"#));
        assert!(inverted.is_err_and(|message| message.contains("z range")));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn host_builds_report_the_runtime_as_unsupported() {
        assert!(attach(EngineConfig::default()).is_err());
        assert!(!is_attached());
        assert!(rescatter().is_err());
        assert!(set_grid_mode(GridScope::All, true).is_err());
        assert!(float_window(WindowId(1)).is_err());
        detach();
    }
}
