//! Clock and entropy helpers shared by the engine and its hosts.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static ENTROPY_COUNTER: Cell<u32> = const { Cell::new(0) };
}

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Returns a fresh 32-bit seed for unseeded randomness.
///
/// Two calls within the same millisecond still differ because a per-thread counter is folded in.
pub fn entropy_seed() -> u32 {
    let counter = ENTROPY_COUNTER.with(|cell| {
        let next = cell.get().wrapping_add(0x9E37_79B9);
        cell.set(next);
        next
    });
    #[cfg(target_arch = "wasm32")]
    let noise = (js_sys::Math::random() * f64::from(u32::MAX)) as u32;
    #[cfg(not(target_arch = "wasm32"))]
    let noise = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or_default();
    let millis = unix_time_ms_now();
    (millis as u32) ^ ((millis >> 32) as u32) ^ noise.rotate_left(13) ^ counter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_entropy_seeds_differ() {
        let first = entropy_seed();
        let second = entropy_seed();
        assert_ne!(first, second);
    }
}
