// SPDX-License-Identifier: MIT

//! `Idle` (§4.2.3): pumps the transport, waiting for either a configuration
//! document (handled by the callback, which requests `APPLYING`) or a
//! shutdown signal.

use std::sync::Arc;

use edge_core::{LifecycleState, TransportEvent};

use crate::context::Context;
use crate::states::EngineState;

pub struct Idle;

impl Idle {
    pub fn new() -> Self {
        Idle
    }
}

impl Default for Idle {
    fn default() -> Self {
        Idle::new()
    }
}

impl EngineState for Idle {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Idle
    }

    fn iterate(&mut self, ctx: &Arc<Context>) {
        if let Ok(TransportEvent::ShouldExit) = ctx.transport.process_event(1000) {
            ctx.set_next(LifecycleState::Destroying);
        }
    }
}
