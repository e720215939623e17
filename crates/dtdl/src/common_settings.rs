// SPDX-License-Identifier: MIT

//! `common_settings`: `process_state`, `log_level`, `inference_settings`,
//! `number_of_inference_per_message`, plus the RUNNING-guarded children
//! `pq_settings`/`port_settings`/`codec_settings` (grounded in
//! `original_source/libs/sm/src/dtdl_model/objects/common_settings.cpp`).

use edge_core::response_code::ResInfo;
use edge_core::{LifecycleState, SensorDriver, StreamHandle};
use serde_json::{json, Value};

use crate::error::NodeError;
use crate::node::{ApplyContext, PropertyNode};
use crate::pq_settings::PqSettings;
use crate::port_settings::PortSettings;
use crate::rule::{approx_eq, check_rules, JsonType, ValidationRule};

/// A purely local scalar field: stored state plus a notification flag on
/// change, no sensor-driver call (`codec_settings.codec`,
/// `inference_settings.number_of_iterations`, `number_of_inference_per_message`).
struct LocalField {
    value: Value,
}

impl LocalField {
    fn new(initial: Value) -> Self {
        LocalField { value: initial }
    }

    /// Returns whether the value actually changed.
    fn set(&mut self, value: Value) -> bool {
        if approx_eq(&self.value, &value) {
            return false;
        }
        self.value = value;
        true
    }
}

/// Requested lifecycle transition encoded in `process_state` (§3,
/// `original_source`'s `EnumToState`): only `Idle`/`Running`/`Destroying`
/// are valid requests from the cloud side.
fn process_state_to_lifecycle(value: u32) -> Option<LifecycleState> {
    LifecycleState::from_process_state(value)
}

pub struct CommonSettings {
    process_state: u32,
    log_level: u32,
    number_of_inference_per_message: LocalField,
    codec: LocalField,
    number_of_iterations: LocalField,
    pub pq_settings: PqSettings,
    pub port_settings: PortSettings,
    /// Set by `apply` when a `process_state` change is requested and
    /// validated; the engine reads and clears this after `update()`
    /// returns (kept out of the property tree itself to avoid a
    /// dependency from this crate back into the engine's configurator).
    pub requested_transition: Option<LifecycleState>,
}

impl Default for CommonSettings {
    fn default() -> Self {
        CommonSettings::new()
    }
}

impl CommonSettings {
    pub fn new() -> Self {
        CommonSettings {
            process_state: 1, // STATE_IDLE
            log_level: 2,     // kWarnLevel
            number_of_inference_per_message: LocalField::new(json!(0)),
            codec: LocalField::new(json!(0)), // JPEG
            number_of_iterations: LocalField::new(json!(0)),
            pq_settings: PqSettings::new(),
            port_settings: PortSettings::new(),
            requested_transition: None,
        }
    }

    pub fn log_level(&self) -> u32 {
        self.log_level
    }

    pub fn number_of_iterations(&self) -> u32 {
        self.number_of_iterations.value.as_u64().unwrap_or(0) as u32
    }

    pub fn codec(&self) -> u32 {
        self.codec.value.as_u64().unwrap_or(0) as u32
    }

    /// Mirrors `SetCurrentState` (`original_source/libs/sm/src/sm_context.cpp`):
    /// keeps `process_state` equal to the engine's lifecycle state whenever
    /// that state is `IDLE`/`RUNNING` (I5). Transient states leave
    /// `process_state` as whatever it last reported.
    pub fn sync_process_state(&mut self, state: LifecycleState) {
        if matches!(state, LifecycleState::Idle | LifecycleState::Running) {
            if let Some(v) = state.to_process_state() {
                self.process_state = v;
            }
        }
    }
}

impl PropertyNode for CommonSettings {
    fn verify(&self, input: &Value) -> Result<(), NodeError> {
        let Value::Object(obj) = input else {
            return Ok(());
        };
        check_rules(
            obj,
            &[
                ValidationRule::ge("process_state", 1.0),
                ValidationRule::le("process_state", 3.0),
                ValidationRule::of_type("log_level", JsonType::Number),
            ],
        )?;
        if let Some(pq) = obj.get("pq_settings") {
            self.pq_settings.verify(pq)?;
        }
        if let Some(port) = obj.get("port_settings") {
            self.port_settings.verify(port)?;
        }
        Ok(())
    }

    fn apply(&mut self, input: &Value, ctx: &mut ApplyContext) -> bool {
        let Value::Object(obj) = input else {
            return true;
        };

        if let Some(v) = obj.get("process_state").and_then(Value::as_u64) {
            self.process_state = v as u32;
            self.requested_transition = process_state_to_lifecycle(v as u32);
        }
        if let Some(v) = obj.get("log_level").and_then(Value::as_u64) {
            if self.log_level != v as u32 {
                self.log_level = v as u32;
                *ctx.notify = true;
            }
        }
        if let Some(v) = obj.get("inference_settings").and_then(|v| v.get("number_of_iterations")).cloned() {
            if self.number_of_iterations.set(v) {
                *ctx.notify = true;
            }
        }

        // §4.1 "RUNNING guards pq_settings/port_settings/codec_settings":
        // while running, a changed value there is rejected wholesale
        // (FAILED_PRECONDITION) rather than partially applied; untouched
        // repeats of the current value are harmless and silently ignored.
        let guarded_unchanged = ["pq_settings", "port_settings", "codec_settings", "number_of_inference_per_message"]
            .iter()
            .all(|key| match obj.get(*key) {
                None => true,
                Some(v) => approx_eq(v, &self.settings_snapshot(key)),
            });

        if ctx.lifecycle_state == LifecycleState::Running {
            if !guarded_unchanged {
                *ctx.res_info = ResInfo {
                    code: edge_core::ResponseCode::FailedPrecondition,
                    res_id: ctx.res_info.res_id.clone(),
                    detail_msg: "Ignoring Port Settings and Pq Settings since state is Running.".into(),
                };
            }
            return true;
        }

        let mut all_ok = true;
        if let Some(v) = obj.get("pq_settings") {
            if !self.pq_settings.apply(v, ctx) {
                all_ok = false;
            }
        }
        if let Some(v) = obj.get("port_settings") {
            if !self.port_settings.apply(v, ctx) {
                all_ok = false;
            }
        }
        if let Some(v) = obj.get("codec_settings").and_then(|c| c.get("codec")).cloned() {
            if self.codec.set(v) {
                *ctx.notify = true;
            }
        }
        if let Some(v) = obj.get("number_of_inference_per_message").cloned() {
            if self.number_of_inference_per_message.set(v) {
                *ctx.notify = true;
            }
        }
        all_ok
    }

    fn initialize_values(&mut self, sensor: &dyn SensorDriver, stream: StreamHandle) {
        self.pq_settings.initialize_values(sensor, stream);
        self.port_settings.initialize_values(sensor, stream);
    }

    fn current(&self) -> Value {
        json!({
            "process_state": self.process_state,
            "log_level": self.log_level,
            "pq_settings": self.pq_settings.current(),
            "port_settings": self.port_settings.current(),
            "codec_settings": {"codec": self.codec.value},
            "inference_settings": {"number_of_iterations": self.number_of_iterations.value},
            "number_of_inference_per_message": self.number_of_inference_per_message.value,
        })
    }
}

impl CommonSettings {
    fn settings_snapshot(&self, key: &str) -> Value {
        match key {
            "pq_settings" => self.pq_settings.current(),
            "port_settings" => self.port_settings.current(),
            "codec_settings" => json!({"codec": self.codec.value}),
            "number_of_inference_per_message" => self.number_of_inference_per_message.value.clone(),
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_core::sensor::{SensorCoreHandle, SensorErrorCause};
    use edge_core::{Frame, SensorError};

    struct NoopSensor;
    impl SensorDriver for NoopSensor {
        fn core_init(&self) -> Result<SensorCoreHandle, SensorError> {
            Ok(SensorCoreHandle(1))
        }
        fn core_exit(&self, _core: SensorCoreHandle) -> Result<(), SensorError> {
            Ok(())
        }
        fn open_stream(&self, _core: SensorCoreHandle, _key: &str) -> Result<StreamHandle, SensorError> {
            Ok(StreamHandle(1))
        }
        fn close_stream(&self, _core: SensorCoreHandle, _stream: StreamHandle) -> Result<(), SensorError> {
            Ok(())
        }
        fn get_property(&self, _stream: StreamHandle, _property: &str) -> Result<Value, SensorError> {
            Ok(json!({}))
        }
        fn set_property(&self, _stream: StreamHandle, _property: &str, _value: &Value) -> Result<(), SensorError> {
            Ok(())
        }
        fn get_frame(&self, _stream: StreamHandle, _timeout_ms: u32) -> Result<Frame, SensorError> {
            unimplemented!()
        }
        fn release_frame(&self, _stream: StreamHandle, _frame: Frame) -> Result<(), SensorError> {
            unimplemented!()
        }
        fn last_error(&self) -> SensorErrorCause {
            SensorErrorCause::Other("n/a".into())
        }
    }

    fn apply(cs: &mut CommonSettings, input: &Value, state: LifecycleState) -> (bool, bool, ResInfo) {
        let sensor = NoopSensor;
        let mut res_info = ResInfo::ok("r1");
        let mut notify = false;
        let mut ctx = ApplyContext {
            sensor: &sensor,
            stream: StreamHandle(1),
            lifecycle_state: state,
            res_info: &mut res_info,
            notify: &mut notify,
        };
        let ok = cs.apply(input, &mut ctx);
        (ok, notify, res_info)
    }

    #[test]
    fn process_state_request_is_recorded_for_the_engine_to_consume() {
        let mut cs = CommonSettings::new();
        apply(&mut cs, &json!({"process_state": 2}), LifecycleState::Idle);
        assert_eq!(cs.requested_transition, Some(LifecycleState::Running));
    }

    #[test]
    fn running_rejects_pq_settings_change_with_failed_precondition_message() {
        let mut cs = CommonSettings::new();
        let (_, _, res_info) = apply(
            &mut cs,
            &json!({"pq_settings": {"digital_zoom": 99.0}}),
            LifecycleState::Running,
        );
        assert!(res_info.detail_msg.contains("Running"));
        assert_eq!(res_info.code, edge_core::ResponseCode::FailedPrecondition);
    }

    #[test]
    fn running_allows_repeating_the_current_pq_settings() {
        let mut cs = CommonSettings::new();
        let current = cs.pq_settings.current();
        let (_, _, res_info) = apply(&mut cs, &json!({"pq_settings": current}), LifecycleState::Running);
        assert!(res_info.detail_msg.is_empty());
    }

    #[test]
    fn idle_applies_codec_and_notifies() {
        let mut cs = CommonSettings::new();
        let (ok, notify, _) = apply(&mut cs, &json!({"codec_settings": {"codec": 1}}), LifecycleState::Idle);
        assert!(ok);
        assert!(notify);
        assert_eq!(cs.codec(), 1);
    }

    #[test]
    fn sync_process_state_tracks_idle_and_running() {
        let mut cs = CommonSettings::new();
        cs.sync_process_state(LifecycleState::Running);
        assert_eq!(cs.process_state, 2);
        cs.sync_process_state(LifecycleState::Idle);
        assert_eq!(cs.process_state, 1);
    }

    #[test]
    fn sync_process_state_leaves_transient_states_unchanged() {
        let mut cs = CommonSettings::new();
        cs.sync_process_state(LifecycleState::Running);
        cs.sync_process_state(LifecycleState::CoolingDown);
        assert_eq!(cs.process_state, 2);
    }
}
