// SPDX-License-Identifier: MIT

//! Boundary to the sensor driver (deliberately out of scope per spec.md
//! §1 — "opaque handles + property get/set + frame iteration + last-error
//! query"). `SensorDriver` is the trait the engine drives; production
//! deployments back it with the real vendor SDK, tests back it with an
//! in-memory fake (see `edge-daemon::testsupport`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorCoreHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamHandle(pub u64);

/// Channel identifiers used by the port-settings → channel-mask mapping
/// (§4.1 "port_settings special semantics").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    InferenceInputImage,
    InferenceOutput,
}

/// `{current, division}` — indexes a frame's payload when it has been split
/// across more than one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subframe {
    pub current: u32,
    pub division: u32,
}

impl Subframe {
    pub fn is_empty(&self) -> bool {
        self.current == 0 && self.division == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
}

/// Raw channel payload plus the typed properties the façade (§4.6) reads
/// off it before handing the bytes to the export layer. Owns its bytes
/// rather than exposing a vendor buffer address directly, since this
/// boundary is a safe-Rust abstraction over the underlying SDK rather
/// than the SDK itself.
#[derive(Debug, Clone)]
pub struct ChannelData {
    pub data: Vec<u8>,
    pub timestamp: u64,
    pub subframe: Subframe,
    pub image: Option<ImageGeometry>,
}

/// A short-lived frame handle (§3.1 "Frame"). Must be released on every
/// path (I2) — callers should treat this as move-only and pass it to
/// `SensorDriver::release_frame` exactly once.
#[derive(Debug, Clone)]
pub struct Frame {
    pub handle: u64,
    pub channels: std::collections::HashMap<ChannelId, ChannelData>,
}

impl Frame {
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelData> {
        self.channels.get(&id)
    }
}

/// Sensor-side cause of the last failing operation, queried via
/// `SensorDriver::last_error` and mapped onto a `ResponseCode` per §7.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorErrorCause {
    OutOfRange,
    InvalidCameraOperationParameter,
    Timeout,
    Other(String),
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor core init failed: {0}")]
    CoreInit(String),
    #[error("sensor open stream failed: {0}")]
    OpenStream(String),
    #[error("get_frame timed out")]
    Timeout,
    #[error("sensor property error on {property}: {message}")]
    Property { property: String, message: String },
    #[error("sensor error: {0}")]
    Other(String),
}

/// Thin contract around the sensor driver: opaque handles, property
/// get/set, frame iteration and last-error query (§1, §4.6).
pub trait SensorDriver: Send + Sync {
    fn core_init(&self) -> Result<SensorCoreHandle, SensorError>;
    fn core_exit(&self, core: SensorCoreHandle) -> Result<(), SensorError>;
    fn open_stream(&self, core: SensorCoreHandle, stream_key: &str)
        -> Result<StreamHandle, SensorError>;
    fn close_stream(&self, core: SensorCoreHandle, stream: StreamHandle)
        -> Result<(), SensorError>;

    /// Reads one property as JSON (the engine never needs to know the
    /// vendor-specific C struct layout; the property nodes in `edge-dtdl`
    /// know how to interpret the shape for each property name).
    fn get_property(&self, stream: StreamHandle, property: &str) -> Result<serde_json::Value, SensorError>;
    fn set_property(
        &self,
        stream: StreamHandle,
        property: &str,
        value: &serde_json::Value,
    ) -> Result<(), SensorError>;

    fn get_frame(&self, stream: StreamHandle, timeout_ms: u32) -> Result<Frame, SensorError>;
    fn release_frame(&self, stream: StreamHandle, frame: Frame) -> Result<(), SensorError>;

    fn last_error(&self) -> SensorErrorCause;
}
