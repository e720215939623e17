// SPDX-License-Identifier: MIT

//! `ScalarLeaf`: the one concrete `PropertyNode` implementation behind
//! every sensor-backed PQ field (§4.1 "Apply policy for leaf sensor-backed
//! nodes"). Every such node — `auto_exposure`, `frame_rate`,
//! `image_cropping`, `codec_settings`'s `codec`, and so on — is shaped the
//! same way: a JSON object or array value, a handful of range/type rules,
//! and a single sensor property key it reads/writes as a whole.

use edge_core::response_code::ResInfo;
use serde_json::Value;

use crate::error::NodeError;
use crate::node::{ApplyContext, PropertyNode};
use crate::rule::{approx_eq, check_rules, check_scalar_rules, ValidationRule};
use crate::sensor_map;

/// Extra verification beyond the per-field rule table, for nodes with a
/// cross-field constraint (e.g. `auto_exposure`'s `min <= max`).
pub type ExtraVerify = fn(&serde_json::Map<String, Value>) -> Result<(), NodeError>;

pub struct ScalarLeaf {
    /// Sensor-driver property key, also used as the field name in error
    /// messages (both are the DTDL field name in the original schema).
    property: &'static str,
    rules: Vec<ValidationRule>,
    extra_verify: Option<ExtraVerify>,
    current: Value,
}

impl ScalarLeaf {
    pub fn new(property: &'static str, rules: Vec<ValidationRule>, initial: Value) -> Self {
        ScalarLeaf {
            property,
            rules,
            extra_verify: None,
            current: initial,
        }
    }

    pub fn with_extra_verify(mut self, f: ExtraVerify) -> Self {
        self.extra_verify = Some(f);
        self
    }

    fn merge(&self, input: &Value) -> (Value, bool) {
        match (&self.current, input) {
            (Value::Object(cur), Value::Object(new)) => {
                let mut merged = cur.clone();
                let mut changed = false;
                for (k, v) in new {
                    if !merged.get(k).is_some_and(|c| approx_eq(c, v)) {
                        merged.insert(k.clone(), v.clone());
                        changed = true;
                    }
                }
                (Value::Object(merged), changed)
            }
            _ => {
                let changed = !approx_eq(&self.current, input);
                (input.clone(), changed)
            }
        }
    }
}

impl PropertyNode for ScalarLeaf {
    fn verify(&self, input: &Value) -> Result<(), NodeError> {
        match input {
            Value::Object(obj) => {
                check_rules(obj, &self.rules)?;
                if let Some(f) = self.extra_verify {
                    f(obj)?;
                }
            }
            other => check_scalar_rules(other, &self.rules)?,
        }
        Ok(())
    }

    fn apply(&mut self, input: &Value, ctx: &mut ApplyContext) -> bool {
        let (merged, changed) = self.merge(input);
        if !changed {
            return true;
        }
        match ctx.sensor.set_property(ctx.stream, self.property, &merged) {
            Ok(()) => {
                self.current = merged;
                *ctx.notify = true;
                true
            }
            Err(err) => {
                let cause = ctx.sensor.last_error();
                let code = sensor_map::code_for_cause(&cause).unwrap_or(ctx.res_info.code);
                *ctx.res_info = ResInfo {
                    code,
                    res_id: ctx.res_info.res_id.clone(),
                    detail_msg: sensor_map::message_for_error(&err),
                };
                false
            }
        }
    }

    fn initialize_values(&mut self, sensor: &dyn edge_core::SensorDriver, stream: edge_core::StreamHandle) {
        if let Ok(value) = sensor.get_property(stream, self.property) {
            self.current = value;
        }
    }

    fn current(&self) -> Value {
        self.current.clone()
    }
}
