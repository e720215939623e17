// SPDX-License-Identifier: MIT

//! `Creating` (§4.2.1): registers the configuration callback, then hands
//! off to `Idle` or fails straight to `Destroying`. The export subsystem
//! is handed to the context already initialized (`Boundary::export`); this
//! state has nothing further to do with it on the way in (see `Destroying`
//! for the matching teardown call).

use std::sync::Arc;

use edge_core::{LifecycleState, ResponseCode};

use crate::context::Context;
use crate::states::EngineState;

pub struct Creating;

impl Creating {
    pub fn new(ctx: &Arc<Context>) -> Self {
        let callback_ctx = Arc::clone(ctx);
        let callback = Box::new(move |_topic: &str, payload: &[u8]| {
            // §4.4 callback steps 2-4: stage the bytes, request APPLYING,
            // mark notification. Envelope parsing (step 1) happens inside
            // `Applying`, which is the only place that owns the DTDL model.
            callback_ctx.stage_configuration(payload.to_vec());
            callback_ctx.request_transition(LifecycleState::Applying);
            callback_ctx.mark_notify();
        });

        match ctx.transport.set_configuration_callback(callback) {
            Ok(()) => {
                ctx.set_next(LifecycleState::Idle);
                ctx.mark_notify();
            }
            Err(err) => {
                ctx.fail(ResponseCode::FailedPrecondition, format!("set_configuration_callback failed: {err}"));
                ctx.set_next(LifecycleState::Destroying);
            }
        }
        Creating
    }
}

impl EngineState for Creating {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Creating
    }

    /// All entry work already ran in `new`; `iterate` itself is a no-op
    /// (the transition was already decided at construction, §4.2.1).
    fn iterate(&mut self, _ctx: &Arc<Context>) {}
}
