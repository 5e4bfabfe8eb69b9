use super::*;

fn unsupported() -> String {
    "The retro window runtime is only available when compiled for wasm32".to_string()
}

pub fn config_script_text() -> Option<String> {
    None
}

pub fn attach(_config: EngineConfig) -> Result<(), String> {
    Err(unsupported())
}

pub fn detach() {}

pub fn is_attached() -> bool {
    false
}

pub fn rescan() -> Result<RescanReport, String> {
    Err(unsupported())
}

pub fn rescatter() -> Result<(), String> {
    Err(unsupported())
}

pub fn set_grid_mode(_scope: GridScope, _on: bool) -> Result<(), String> {
    Err(unsupported())
}

pub fn float_window(_window_id: WindowId) -> Result<(), String> {
    Err(unsupported())
}

pub fn dock_window(_window_id: WindowId) -> Result<(), String> {
    Err(unsupported())
}

pub fn snapshot() -> Result<StoreSnapshot, String> {
    Err(unsupported())
}
