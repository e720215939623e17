// SPDX-License-Identifier: MIT

//! edge-core: shared primitives for the edge-application runtime core.
//!
//! This crate owns nothing that talks to real hardware or a real cloud
//! transport. It defines the closed enums the rest of the workspace agrees
//! on (lifecycle state, response code) and the traits that mark the
//! boundary to external collaborators (sensor driver, event/cloud
//! transport, async export layer, user callbacks).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod callbacks;
pub mod export;
pub mod feasibility;
pub mod response_code;
pub mod sensor;
pub mod state;
pub mod transport;

pub use callbacks::UserCallbacks;
pub use export::{ExportError, ExportKind, ExportSink};
pub use feasibility::is_feasible;
pub use response_code::ResponseCode;
pub use sensor::{
    ChannelData, ChannelId, Frame, ImageGeometry, SensorCoreHandle, SensorDriver, SensorError,
    SensorErrorCause, StreamHandle, Subframe,
};
pub use state::LifecycleState;
pub use transport::{Transport, TransportError, TransportEvent};
