// SPDX-License-Identifier: MIT

//! `Destroying` (§4.2.6): tears down the sensor stream/core and calls
//! `onDestroy`. Runs once — the core loop breaks as soon as it observes
//! `current == Destroying`, which happens right after this `iterate` call.

use std::sync::Arc;

use edge_core::LifecycleState;

use crate::context::Context;
use crate::states::EngineState;

pub struct Destroying;

impl Destroying {
    pub fn new() -> Self {
        Destroying
    }
}

impl Default for Destroying {
    fn default() -> Self {
        Destroying::new()
    }
}

impl EngineState for Destroying {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Destroying
    }

    fn iterate(&mut self, ctx: &Arc<Context>) {
        let _ = ctx.callbacks.on_destroy();

        if let Some(stream) = ctx.stream_handle.lock().take() {
            if let Some(core) = *ctx.core_handle.lock() {
                let _ = ctx.sensor.close_stream(core, stream);
            }
        }
        if let Some(core) = ctx.core_handle.lock().take() {
            let _ = ctx.sensor.core_exit(core);
        }
        // The export boundary (`ExportSink`) exposes no explicit teardown
        // hook; it is dropped along with the context at process exit.
    }
}
