// SPDX-License-Identifier: MIT

//! `port_settings`: per-channel export configuration (`input_tensor`,
//! `metadata`) plus the channel-enable mask it drives on the sensor stream
//! (grounded in `original_source/libs/tests/unit/sm/dtdl_model/test_port_settings.cpp`,
//! which asserts the sensor's `INPUT_DATA_TYPE` property mask reflects each
//! channel's `enabled` flag).

use edge_core::sensor::ChannelId;
use edge_core::{ResponseCode, SensorDriver, StreamHandle};
use serde_json::{json, Map, Value};

use crate::error::NodeError;
use crate::node::{ApplyContext, PropertyNode};
use crate::rule::{check_rules, JsonType, ValidationRule};

/// Sensor-driver property key carrying the set of enabled channels.
pub const INPUT_DATA_TYPE_PROPERTY: &str = "input_data_type";

fn default_port_setting() -> Value {
    json!({
        "method": 0,
        "storage_name": "",
        "endpoint": "",
        "path": "",
        "enabled": false,
    })
}

fn port_setting_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::of_type("method", JsonType::Number),
        ValidationRule::of_type("storage_name", JsonType::String),
        ValidationRule::of_type("endpoint", JsonType::String),
        ValidationRule::of_type("path", JsonType::String),
        ValidationRule::of_type("enabled", JsonType::Bool),
    ]
}

/// One export target's configuration. Purely stored state: nothing here
/// talks to the sensor driver directly (that's `PortSettings::apply`,
/// which derives the channel mask from both children at once).
struct PortSetting {
    current: Value,
}

impl PortSetting {
    fn new() -> Self {
        PortSetting { current: default_port_setting() }
    }

    fn enabled(&self) -> bool {
        self.current.get("enabled").and_then(Value::as_bool).unwrap_or(false)
    }

    fn merge(&mut self, input: &Value) -> bool {
        let Value::Object(new) = input else { return false };
        let Value::Object(cur) = &mut self.current else { return false };
        let mut changed = false;
        for (k, v) in new {
            if cur.get(k) != Some(v) {
                cur.insert(k.clone(), v.clone());
                changed = true;
            }
        }
        changed
    }
}

pub struct PortSettings {
    input_tensor: PortSetting,
    metadata: PortSetting,
}

impl Default for PortSettings {
    fn default() -> Self {
        PortSettings::new()
    }
}

impl PortSettings {
    pub fn new() -> Self {
        PortSettings { input_tensor: PortSetting::new(), metadata: PortSetting::new() }
    }

    pub fn input_tensor_enabled(&self) -> bool {
        self.input_tensor.enabled()
    }

    pub fn metadata_enabled(&self) -> bool {
        self.metadata.enabled()
    }

    fn channel_mask(&self) -> Vec<ChannelId> {
        let mut mask = Vec::new();
        if self.input_tensor.enabled() {
            mask.push(ChannelId::InferenceInputImage);
        }
        if self.metadata.enabled() {
            mask.push(ChannelId::InferenceOutput);
        }
        mask
    }
}

fn channel_name(id: ChannelId) -> &'static str {
    match id {
        ChannelId::InferenceInputImage => "inference_input_image",
        ChannelId::InferenceOutput => "inference_output",
    }
}

/// Reads the `enabled` flag a child would end up with after merging
/// `incoming` on top of `current`, without mutating either.
fn effective_enabled(current: &PortSetting, incoming: Option<&Value>) -> bool {
    match incoming.and_then(|v| v.get("enabled")).and_then(Value::as_bool) {
        Some(v) => v,
        None => current.enabled(),
    }
}

impl PropertyNode for PortSettings {
    fn verify(&self, input: &Value) -> Result<(), NodeError> {
        let Value::Object(obj) = input else {
            return Ok(());
        };
        let rules = port_setting_rules();
        for key in ["input_tensor", "metadata"] {
            if let Some(Value::Object(child)) = obj.get(key) {
                check_rules(child, &rules)?;
            }
        }
        let input_enabled = effective_enabled(&self.input_tensor, obj.get("input_tensor"));
        let metadata_enabled = effective_enabled(&self.metadata, obj.get("metadata"));
        if !input_enabled && !metadata_enabled {
            return Err(NodeError::new(
                "port_settings",
                "Neither input tensor or metadata are enabled",
                crate::error::NodeErrorCode::InvalidArgument,
            ));
        }
        Ok(())
    }

    fn apply(&mut self, input: &Value, ctx: &mut ApplyContext) -> bool {
        let Value::Object(obj) = input else {
            return true;
        };
        let input_enabled = effective_enabled(&self.input_tensor, obj.get("input_tensor"));
        let metadata_enabled = effective_enabled(&self.metadata, obj.get("metadata"));
        if !input_enabled && !metadata_enabled {
            // verify() should have caught this already; apply is defensive
            // in case a caller skips straight to apply.
            *ctx.res_info = edge_core::response_code::ResInfo {
                code: ResponseCode::InvalidArgument,
                res_id: ctx.res_info.res_id.clone(),
                detail_msg: "Neither input tensor or metadata are enabled".into(),
            };
            return false;
        }
        let mut changed = false;
        if let Some(value) = obj.get("input_tensor") {
            changed |= self.input_tensor.merge(value);
        }
        if let Some(value) = obj.get("metadata") {
            changed |= self.metadata.merge(value);
        }
        if !changed {
            return true;
        }
        let mask: Vec<Value> = self.channel_mask().into_iter().map(|c| json!(channel_name(c))).collect();
        match ctx.sensor.set_property(ctx.stream, INPUT_DATA_TYPE_PROPERTY, &Value::Array(mask)) {
            Ok(()) => {
                *ctx.notify = true;
                true
            }
            Err(err) => {
                let cause = ctx.sensor.last_error();
                let code = crate::sensor_map::code_for_cause(&cause).unwrap_or(ctx.res_info.code);
                *ctx.res_info = edge_core::response_code::ResInfo {
                    code,
                    res_id: ctx.res_info.res_id.clone(),
                    detail_msg: crate::sensor_map::message_for_error(&err),
                };
                false
            }
        }
    }

    fn initialize_values(&mut self, _sensor: &dyn SensorDriver, _stream: StreamHandle) {}

    fn current(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("input_tensor".to_string(), self.input_tensor.current.clone());
        obj.insert("metadata".to_string(), self.metadata.current.clone());
        Value::Object(obj)
    }
}
