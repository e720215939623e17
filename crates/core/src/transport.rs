// SPDX-License-Identifier: MIT

//! Boundary to the event/cloud transport (§1, §6.2). Deliberately minimal:
//! the engine only needs to pump events, push state, and register the one
//! callback it cares about.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// One or more events were processed; keep looping.
    Processed,
    /// Graceful-shutdown sentinel (`SHOULDEXIT`, §4.2.3/§4.2.4/§7.2). Not an
    /// error — triggers a transition to `DESTROYING`.
    ShouldExit,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport not initialized")]
    NotInitialized,
    #[error("transport error: {0}")]
    Other(String),
}

/// Configuration callback signature: `(topic, payload)` (§4.4).
pub type ConfigurationCallback = Box<dyn Fn(&str, &[u8]) + Send + Sync>;

pub trait Transport: Send + Sync {
    /// Registers the configuration callback (C7). Returns an error if a
    /// callback is already registered or the transport failed to wire it up
    /// — `Creating` (§4.2.1) treats that as a fatal startup failure.
    fn set_configuration_callback(&self, callback: ConfigurationCallback) -> Result<(), TransportError>;

    /// Pumps one batch of transport events, blocking up to `timeout_ms`.
    fn process_event(&self, timeout_ms: u32) -> Result<TransportEvent, TransportError>;

    /// Pushes the current DTDL document to `topic`.
    fn send_state(&self, topic: &str, bytes: &[u8]) -> Result<(), TransportError>;

    /// Asynchronous blob PUT/GET, fired and forgotten by the engine; kept
    /// as a boundary method because `ai_models` entries reference blobs by
    /// URL, but the transfer itself is entirely the transport's concern.
    fn blob_operation(&self, url_path: &str) -> Result<(), TransportError>;

    /// Asynchronous telemetry send.
    fn send_telemetry(&self, entries: &[(String, String)]) -> Result<(), TransportError>;
}
