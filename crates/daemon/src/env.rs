// SPDX-License-Identifier: MIT

//! Centralized environment-variable access for the daemon binary.

/// Sensor stream key passed to `sensor.open_stream` on entering `Applying`.
pub fn stream_key() -> String {
    std::env::var("EDGE_APP_STREAM_KEY").unwrap_or_else(|_| "default".to_string())
}

/// `RUST_LOG`-style filter for the tracing subscriber, falling back to a
/// sensible default when unset.
pub fn log_filter() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}
