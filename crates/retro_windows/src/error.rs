//! Error type for engine operations.
//!
//! Nothing here is meant to reach the user. Adapters log these and carry on; the variants exist
//! so callers and tests can tell a stale reference from an unmeasurable element.

use thiserror::Error;

use crate::model::{CanvasId, WindowId};

/// Non-fatal failures raised while manipulating canvases, windows and images.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The canvas is not registered or its element is gone.
    #[error("canvas not found: {0}")]
    CanvasNotFound(CanvasId),
    /// The window is not registered or its element is gone.
    #[error("window not found: {0}")]
    WindowNotFound(WindowId),
    /// The placeholder paired with a window could not be located.
    #[error("placeholder missing for window {0}")]
    PlaceholderMissing(WindowId),
    /// An element exists but could not be measured (detached or not laid out).
    #[error("element not measurable: {0}")]
    Unmeasurable(&'static str),
    /// Configuration values are inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A canvas draw call failed.
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_missing_thing() {
        assert_eq!(
            EngineError::WindowNotFound(WindowId(4)).to_string(),
            "window not found: 4"
        );
        assert_eq!(
            EngineError::PlaceholderMissing(WindowId(2)).to_string(),
            "placeholder missing for window 2"
        );
        assert_eq!(
            EngineError::Unmeasurable("canvas").to_string(),
            "element not measurable: canvas"
        );
    }
}
