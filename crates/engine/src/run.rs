// SPDX-License-Identifier: MIT

//! The state-machine core loop (C5, §4.3). Owns state-object construction
//! and destruction; the only place `Context::commit_current` is called.

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::Context;
use crate::error::EngineError;
use crate::states::{self, STATE_TOPIC};

/// Drives the engine to completion. Returns once the loop has observed
/// `current == Destroying` and run that state's single `iterate`.
pub fn run(ctx: Arc<Context>) {
    let mut current = states::build(ctx.current(), &ctx);

    loop {
        current.iterate(&ctx);

        if ctx.current() == edge_core::LifecycleState::Destroying {
            break;
        }

        let mut next = ctx.next();
        if next != ctx.current() {
            let mut built = states::build(next, &ctx);
            // Construction may itself change `next` (e.g. `Running` whose
            // `onStart` fails re-targets `IDLE`); re-dispatch once more if
            // so rather than run a state that no longer matches `next`
            // (§4.3 step 3).
            let mut reread = ctx.next();
            while reread != next {
                next = reread;
                built = states::build(next, &ctx);
                reread = ctx.next();
            }
            info!(from = %current.kind(), to = %next, "lifecycle transition");
            current = built;
            ctx.commit_current(next);
        }

        if ctx.take_notify() {
            let response = ctx.dtdl.lock().to_response();
            match serde_json::to_vec(&response) {
                Ok(bytes) => {
                    if let Err(err) = ctx.transport.send_state(STATE_TOPIC, &bytes) {
                        let err = EngineError::Transport(err.to_string());
                        warn!(%err, "failed to publish state document");
                    }
                }
                Err(err) => warn!(%err, "failed to serialize state document"),
            }
        }
    }
}
