//! `setTimeout`-backed [`TimerHost`].

use platform_host::{TimerCallback, TimerHost, TimerId};
use wasm_bindgen::{closure::Closure, JsCast};

/// Timer host for the browser UI thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebTimerHost;

impl TimerHost for WebTimerHost {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Option<TimerId> {
        let window = web_sys::window()?;
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let callback = Closure::once_into_js(move || callback());
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
            .ok()
            .map(TimerId)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(id.0);
        }
    }
}
