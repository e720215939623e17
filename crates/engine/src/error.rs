// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Engine-internal failure. Most of these are absorbed into `res_info`
/// rather than propagated — see `ctx::fail` — but a handful of
/// construction-time failures (sensor core/stream init) are fatal enough
/// to be worth a distinct variant for tests and logs (§7.1).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sensor core init failed: {0}")]
    SensorCoreInit(String),
    #[error("sensor open stream failed: {0}")]
    SensorOpenStream(String),
    #[error("callback {name} gave error res={code}")]
    CallbackFailure { name: &'static str, code: i32 },
    #[error("transport error: {0}")]
    Transport(String),
}
