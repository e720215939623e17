// SPDX-License-Identifier: MIT

//! The six lifecycle states (C3): each implements exactly one method,
//! `iterate`. Entry and exit side effects live in construction and `Drop`
//! respectively, so the state object's lifetime *is* its lifecycle phase.

mod applying;
mod cooling_down;
mod creating;
mod destroying;
mod exiting;
mod idle;
mod running;

pub use applying::Applying;
pub use cooling_down::CoolingDown;
pub use creating::Creating;
pub use destroying::Destroying;
pub use exiting::Exiting;
pub use idle::Idle;
pub use running::Running;

use std::sync::Arc;

use edge_core::LifecycleState;

use crate::context::Context;

/// Topic the current DTDL document is published to on notification (§4.3
/// step 4).
pub const STATE_TOPIC: &str = "state";

pub trait EngineState: Send {
    fn kind(&self) -> LifecycleState;

    /// Runs one pass of this state's per-loop work. Entry effects already
    /// ran in the constructor; exit effects run in `Drop` when the core
    /// loop replaces this object.
    fn iterate(&mut self, ctx: &Arc<Context>);
}

/// The factory (§4.2.7): produces a freshly constructed state object for
/// `kind`, used both by the core loop on every transition and by recovery
/// paths (e.g. `Running`'s failed `onStart`).
pub fn build(kind: LifecycleState, ctx: &Arc<Context>) -> Box<dyn EngineState> {
    match kind {
        LifecycleState::Creating => Box::new(Creating::new(ctx)),
        LifecycleState::Applying => Box::new(Applying::new(ctx)),
        LifecycleState::Idle => Box::new(Idle::new()),
        LifecycleState::Running => Box::new(Running::new(ctx)),
        LifecycleState::CoolingDown => Box::new(CoolingDown::new()),
        LifecycleState::Destroying => Box::new(Destroying::new()),
        LifecycleState::Exiting => Box::new(Exiting::new()),
    }
}
