// SPDX-License-Identifier: MIT

//! `PropertyNode`: the uniform contract every configuration element
//! implements (§4.1). A tagged-enum rule table and a single trait replace
//! the source's `JsonObject` base-class inheritance (§9 design note).

use edge_core::response_code::ResInfo;
use edge_core::{LifecycleState, SensorDriver, StreamHandle};
use serde_json::Value;

use crate::error::NodeError;

/// Context threaded through `apply` calls: the sensor boundary, the
/// engine's current lifecycle state (needed by `common_settings`'s
/// RUNNING guard, §4.1), and the two pieces of shared mutable state an
/// apply can affect — the response being built and the pending
/// notification flag (§3.1 "Notification").
pub struct ApplyContext<'a> {
    pub sensor: &'a dyn SensorDriver,
    pub stream: StreamHandle,
    pub lifecycle_state: LifecycleState,
    pub res_info: &'a mut ResInfo,
    pub notify: &'a mut bool,
}

/// A node in the configuration tree (§4.1). Every node owns its current
/// JSON value; `verify`/`apply` never see or mutate a sibling's storage
/// (I7).
pub trait PropertyNode {
    /// Pure check of `input` against this node's rules and (for composites)
    /// its children, recursively. Short-circuits at the first failing
    /// field (§7.2).
    fn verify(&self, input: &Value) -> Result<(), NodeError>;

    /// Mutates current value and/or triggers sensor-driver side effects.
    /// Returns whether this node's own apply succeeded; composites must
    /// still attempt every child regardless of an earlier child's result
    /// (§4.1 "Siblings are applied independently").
    fn apply(&mut self, input: &Value, ctx: &mut ApplyContext) -> bool;

    /// Reads current state from the sensor driver into this node's value.
    /// Default no-op; overridden by leaf PQ nodes and composites that
    /// contain them (§4.1, used once on entering `Applying`).
    fn initialize_values(&mut self, _sensor: &dyn SensorDriver, _stream: StreamHandle) {}

    /// Owned snapshot of this node's current JSON subtree.
    fn current(&self) -> Value;
}
