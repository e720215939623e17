// SPDX-License-Identifier: MIT

//! `Running` (§4.2.4): construction calls `onStart` and spawns the worker
//! (C8); destruction stops the worker and calls `onStop`. A failed
//! `onStart` is recorded so `Drop` can skip overwriting `res_info` with a
//! (likely redundant) `onStop` failure.

use std::sync::Arc;

use edge_core::{LifecycleState, ResponseCode, TransportEvent};

use crate::context::Context;
use crate::error::EngineError;
use crate::states::{EngineState, STATE_TOPIC};

pub struct Running {
    ctx: Arc<Context>,
    failed_on_start: bool,
}

impl Running {
    pub fn new(ctx: &Arc<Context>) -> Self {
        let ctx = Arc::clone(ctx);
        let failed_on_start = ctx.callbacks.on_start() != 0;

        if failed_on_start {
            let err = EngineError::CallbackFailure { name: "onStart", code: -1 };
            tracing::error!(%err, "running state entry failed");
            ctx.fail(ResponseCode::FailedPrecondition, err.to_string());
            ctx.set_next(LifecycleState::Idle);
        } else {
            let response = ctx.dtdl.lock().to_response();
            if let Ok(bytes) = serde_json::to_vec(&response) {
                let _ = ctx.transport.send_state(STATE_TOPIC, &bytes);
            }
            let iterations = ctx.dtdl.lock().number_of_iterations();
            ctx.worker.start(Arc::clone(&ctx), iterations);
        }

        Running { ctx, failed_on_start }
    }
}

impl EngineState for Running {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Running
    }

    fn iterate(&mut self, ctx: &Arc<Context>) {
        if let Ok(TransportEvent::ShouldExit) = ctx.transport.process_event(1000) {
            ctx.set_next(LifecycleState::Destroying);
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        // Safe to call even if the worker was never started (failed_on_start).
        self.ctx.worker.stop(&self.ctx);
        let stop_failed = self.ctx.callbacks.on_stop() != 0;
        if stop_failed && !self.failed_on_start {
            let err = EngineError::CallbackFailure { name: "onStop", code: -1 };
            tracing::error!(%err, "running state exit failed");
            self.ctx.fail(ResponseCode::FailedPrecondition, err.to_string());
        }
    }
}
