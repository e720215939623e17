// SPDX-License-Identifier: MIT

//! `CoolingDown` (§4.2.5): entered when the worker's bounded-iteration run
//! completes. Drains pending async exports before handing control back to
//! `Idle`.

use std::sync::Arc;

use edge_core::LifecycleState;

use crate::context::Context;
use crate::states::EngineState;

pub struct CoolingDown;

impl CoolingDown {
    pub fn new() -> Self {
        CoolingDown
    }
}

impl Default for CoolingDown {
    fn default() -> Self {
        CoolingDown::new()
    }
}

impl EngineState for CoolingDown {
    fn kind(&self) -> LifecycleState {
        LifecycleState::CoolingDown
    }

    fn iterate(&mut self, ctx: &Arc<Context>) {
        if ctx.next() == LifecycleState::Destroying {
            return;
        }
        while ctx.export.has_pending_operations() {
            let _ = ctx.transport.process_event(1000);
        }
        ctx.set_next(LifecycleState::Idle);
        ctx.mark_notify();
    }
}
