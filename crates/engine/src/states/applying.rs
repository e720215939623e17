// SPDX-License-Identifier: MIT

//! `Applying` (§4.2.2): the lazy one-time sensor bring-up (gated by
//! `Context::applying_initialized`, not by this object's own lifetime —
//! the core loop may construct and drop many `Applying` instances over the
//! engine's life, but the bring-up sequence must run exactly once), then
//! per-iterate configuration consumption.

use std::sync::Arc;

use edge_core::{LifecycleState, ResponseCode};
use edge_wire::ConfigDocument;

use crate::context::Context;
use crate::error::EngineError;
use crate::states::EngineState;

pub struct Applying {
    /// The lifecycle state the engine was in immediately before entering
    /// `Applying` (captured here because the core loop constructs the next
    /// state object *before* committing it as current — by the time
    /// `iterate()` runs, `ctx.current()` already reads back `Applying`
    /// itself). The RUNNING-guard in `common_settings` needs to know
    /// whether the document is being applied against a running engine,
    /// not against this transient state.
    prior_state: LifecycleState,
}

impl Applying {
    pub fn new(ctx: &Arc<Context>) -> Self {
        Applying { prior_state: ctx.current() }
    }

    fn bring_up(&self, ctx: &Arc<Context>) -> bool {
        let core = match ctx.sensor.core_init() {
            Ok(core) => core,
            Err(err) => {
                let err = EngineError::SensorCoreInit(err.to_string());
                tracing::error!(%err, "sensor bring-up failed");
                ctx.fail(ResponseCode::FailedPrecondition, err.to_string());
                ctx.set_next(LifecycleState::Destroying);
                return false;
            }
        };
        *ctx.core_handle.lock() = Some(core);

        let stream = match ctx.sensor.open_stream(core, &ctx.stream_key) {
            Ok(stream) => stream,
            Err(err) => {
                let _ = ctx.sensor.core_exit(core);
                *ctx.core_handle.lock() = None;
                let err = EngineError::SensorOpenStream(err.to_string());
                tracing::error!(%err, "sensor bring-up failed");
                ctx.fail(ResponseCode::FailedPrecondition, err.to_string());
                ctx.set_next(LifecycleState::Destroying);
                return false;
            }
        };
        *ctx.stream_handle.lock() = Some(stream);

        ctx.dtdl.lock().initialize_values(ctx.sensor.as_ref(), stream);

        if ctx.callbacks.on_create() != 0 {
            let _ = ctx.sensor.close_stream(core, stream);
            let _ = ctx.sensor.core_exit(core);
            *ctx.stream_handle.lock() = None;
            *ctx.core_handle.lock() = None;
            let err = EngineError::CallbackFailure { name: "onCreate", code: -1 };
            tracing::error!(%err, "sensor bring-up failed");
            ctx.fail(ResponseCode::FailedPrecondition, err.to_string());
            ctx.set_next(LifecycleState::Idle);
            return false;
        }

        ctx.set_applying_initialized();
        true
    }
}

impl EngineState for Applying {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Applying
    }

    fn iterate(&mut self, ctx: &Arc<Context>) {
        if !ctx.applying_initialized() && !self.bring_up(ctx) {
            return;
        }

        let Some(bytes) = ctx.take_pending_configuration() else {
            return;
        };

        let doc = match ConfigDocument::parse_envelope(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                ctx.fail(ResponseCode::InvalidArgument, err.to_string());
                ctx.set_next(LifecycleState::Idle);
                return;
            }
        };
        self.apply_document(ctx, &doc);
    }
}

impl Applying {
    fn apply_document(&self, ctx: &Arc<Context>, doc: &ConfigDocument) {
        let mut dtdl = ctx.dtdl.lock();
        if let Err(err) = dtdl.verify(doc) {
            let failure = edge_core::response_code::ResInfo::fail(
                doc.req_info.req_id.clone(),
                err.code.into(),
                format!("{}: {}", err.field, err.message),
            );
            dtdl.set_res_info(failure);
            drop(dtdl);
            ctx.mark_notify();
            ctx.set_next(LifecycleState::Idle);
            return;
        }

        let Some(stream) = ctx.current_stream() else {
            drop(dtdl);
            ctx.set_next(LifecycleState::Idle);
            return;
        };

        let notify = dtdl.apply(doc, ctx.sensor.as_ref(), stream, self.prior_state, ctx.callbacks.as_ref());
        let requested = dtdl.take_requested_transition();
        drop(dtdl);

        if notify {
            ctx.mark_notify();
        }
        // §4.2.2: "restore next state to the process_state field requested
        // by the document". A document that doesn't touch process_state
        // isn't requesting a transition at all — stay in whatever state
        // the engine was in before this configuration episode started
        // (S3: a port_settings-only document delivered while RUNNING must
        // leave the engine in RUNNING, not drop it to IDLE).
        ctx.set_next(requested.unwrap_or(self.prior_state));
    }
}
