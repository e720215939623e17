// SPDX-License-Identifier: MIT

//! `Exiting`: the terminal sink past `Destroying` (§6.3 feasibility table —
//! `DESTROYING -> EXITING` is the only way in, and `EXITING` only loops to
//! itself). The core loop never constructs this state itself (it breaks as
//! soon as `current == Destroying`); it exists so the factory is total and
//! so a host process can mark final bookkeeping complete after `run()`
//! returns.

use std::sync::Arc;

use edge_core::LifecycleState;

use crate::context::Context;
use crate::states::EngineState;

pub struct Exiting;

impl Exiting {
    pub fn new() -> Self {
        Exiting
    }
}

impl Default for Exiting {
    fn default() -> Self {
        Exiting::new()
    }
}

impl EngineState for Exiting {
    fn kind(&self) -> LifecycleState {
        LifecycleState::Exiting
    }

    fn iterate(&mut self, _ctx: &Arc<Context>) {}
}
