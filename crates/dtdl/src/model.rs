// SPDX-License-Identifier: MIT

//! `DtdlModel`: the top-level configuration tree (§3.1) — `req_info`,
//! `res_info`, `common_settings`, `custom_settings`, `ai_models` — and the
//! verify-then-apply entry point the `Applying` state drives (§4.1, §4.4).

use edge_core::response_code::ResInfo;
use edge_core::{LifecycleState, ResponseCode, SensorDriver, StreamHandle, UserCallbacks};
use edge_wire::{AiModelEntry, ConfigDocument, ReqInfo, ResponseDocument, MAX_AI_MODELS};
use serde_json::Value;

use crate::common_settings::CommonSettings;
use crate::error::NodeError;
use crate::node::{ApplyContext, PropertyNode};

pub struct DtdlModel {
    req_info: ReqInfo,
    res_info: ResInfo,
    common_settings: CommonSettings,
    custom_settings: Value,
    ai_models: Vec<AiModelEntry>,
}

impl Default for DtdlModel {
    fn default() -> Self {
        DtdlModel::new()
    }
}

impl DtdlModel {
    pub fn new() -> Self {
        DtdlModel {
            req_info: ReqInfo::default(),
            res_info: ResInfo::ok(""),
            common_settings: CommonSettings::new(),
            custom_settings: Value::Object(Default::default()),
            ai_models: Vec::new(),
        }
    }

    pub fn res_info(&self) -> &ResInfo {
        &self.res_info
    }

    /// Overwrites `res_info` directly, for state-level failures that never
    /// go through a property node's `apply` (§7.1 `CallbackFailure`,
    /// `SensorError` during construction).
    pub fn set_res_info(&mut self, res_info: ResInfo) {
        self.res_info = res_info;
    }

    pub fn log_level(&self) -> u32 {
        self.common_settings.log_level()
    }

    pub fn number_of_iterations(&self) -> u32 {
        self.common_settings.number_of_iterations()
    }

    pub fn codec(&self) -> u32 {
        self.common_settings.codec()
    }

    /// Called by the engine on every committed lifecycle transition (§4.4,
    /// I5) so `common_settings.process_state` never drifts from reality
    /// while the engine is at `IDLE`/`RUNNING`.
    pub fn sync_process_state(&mut self, state: LifecycleState) {
        self.common_settings.sync_process_state(state);
    }

    pub fn input_tensor_export_enabled(&self) -> bool {
        self.common_settings.port_settings.input_tensor_enabled()
    }

    pub fn metadata_export_enabled(&self) -> bool {
        self.common_settings.port_settings.metadata_enabled()
    }

    /// Pure check, run before any side effect (§7.2: verify fully before
    /// applying). `ai_models` truncation is reported but is not itself a
    /// verification failure (§3.1: entries past the bound are dropped, not
    /// rejected).
    pub fn verify(&self, doc: &ConfigDocument) -> Result<(), NodeError> {
        self.common_settings.verify(&doc.common_settings)
    }

    /// Applies a verified document. `lifecycle_state` gates the
    /// RUNNING-guarded `common_settings` children; `requested_transition`
    /// (if any) is left on `common_settings` for the caller (the engine's
    /// `Applying` state) to act on after this returns.
    ///
    /// Returns whether any node actually changed (i.e. whether the engine
    /// should emit a device-state notification, §3.1 "Notification").
    pub fn apply(
        &mut self,
        doc: &ConfigDocument,
        sensor: &dyn SensorDriver,
        stream: StreamHandle,
        lifecycle_state: LifecycleState,
        callbacks: &dyn UserCallbacks,
    ) -> bool {
        self.req_info = doc.req_info.clone();
        self.res_info = ResInfo::ok(&doc.req_info.req_id);

        self.ai_models = doc.ai_models.iter().take(MAX_AI_MODELS).cloned().collect();

        let mut notify = false;
        {
            let mut ctx = ApplyContext {
                sensor,
                stream,
                lifecycle_state,
                res_info: &mut self.res_info,
                notify: &mut notify,
            };
            if !self.common_settings.apply(&doc.common_settings, &mut ctx) {
                if self.res_info.is_ok() {
                    self.res_info.code = ResponseCode::Internal;
                }
            }
        }

        if !crate::rule::approx_eq(&self.custom_settings, &doc.custom_settings) {
            self.custom_settings = doc.custom_settings.clone();
            notify = true;
            let payload = self.custom_settings.to_string();
            if callbacks.on_configure("custom_settings", payload.as_bytes()) != 0 {
                self.res_info.code = ResponseCode::Internal;
            }
        }

        notify
    }

    pub fn initialize_values(&mut self, sensor: &dyn SensorDriver, stream: StreamHandle) {
        self.common_settings.initialize_values(sensor, stream);
    }

    /// Consumes and clears the pending lifecycle-transition request left
    /// by `apply` (`process_state`, §9's avoidance of hidden global state
    /// in this crate).
    pub fn take_requested_transition(&mut self) -> Option<LifecycleState> {
        self.common_settings.requested_transition.take()
    }

    pub fn to_response(&self) -> ResponseDocument {
        ResponseDocument {
            req_info: self.req_info.clone(),
            res_info: self.res_info.clone(),
            common_settings: self.common_settings.current(),
            custom_settings: self.custom_settings.clone(),
            ai_models: self.ai_models.clone(),
        }
    }
}
