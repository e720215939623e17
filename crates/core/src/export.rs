// SPDX-License-Identifier: MIT

//! Boundary to the asynchronous export subsystem (C9, §4.6). The engine's
//! only obligations toward it: send each enabled channel's payload once per
//! frame, and drain pending operations before the stream is closed
//! (`CoolingDown`, §4.2.5).

use crate::sensor::Subframe;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    InputTensor,
    Metadata,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export send failed: {0}")]
    SendFailed(String),
}

pub trait ExportSink: Send + Sync {
    /// Sends one channel's raw payload synchronously (§4.6: `send_sync`
    /// with an effectively unbounded timeout from the engine's point of
    /// view — the export layer owns its own retry/backoff policy).
    #[allow(clippy::too_many_arguments)]
    fn send_sync(
        &self,
        kind: ExportKind,
        data: &[u8],
        properties: &serde_json::Value,
        timestamp_ns: u64,
        subframe: Subframe,
    ) -> Result<(), ExportError>;

    /// True while an async export is still in flight; polled by
    /// `CoolingDown` before it lets the engine continue (§4.2.5).
    fn has_pending_operations(&self) -> bool;
}
