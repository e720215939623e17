// SPDX-License-Identifier: MIT

//! Validation rule kinds (§4.1 table): `Ge|Le|Gt|Lt|Ne|Type`.

use crate::error::{NodeError, NodeErrorCode};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Number,
    String,
    Bool,
    Object,
    Array,
}

impl JsonType {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonType::Number => value.is_number(),
            JsonType::String => value.is_string(),
            JsonType::Bool => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Bool => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    Ge(f64),
    Gt(f64),
    Le(f64),
    Lt(f64),
    Ne(f64),
    Type(JsonType),
}

#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub field: &'static str,
    pub rule: RuleKind,
}

impl ValidationRule {
    pub const fn ge(field: &'static str, v: f64) -> Self {
        ValidationRule { field, rule: RuleKind::Ge(v) }
    }
    pub const fn gt(field: &'static str, v: f64) -> Self {
        ValidationRule { field, rule: RuleKind::Gt(v) }
    }
    pub const fn le(field: &'static str, v: f64) -> Self {
        ValidationRule { field, rule: RuleKind::Le(v) }
    }
    pub const fn lt(field: &'static str, v: f64) -> Self {
        ValidationRule { field, rule: RuleKind::Lt(v) }
    }
    pub const fn ne(field: &'static str, v: f64) -> Self {
        ValidationRule { field, rule: RuleKind::Ne(v) }
    }
    pub const fn of_type(field: &'static str, t: JsonType) -> Self {
        ValidationRule { field, rule: RuleKind::Type(t) }
    }
}

/// Runs every rule whose field is present in `obj`, rejecting at the first
/// violation (§4.1 rule table: "Semantics (rejects when)"). Fields absent
/// from `obj` are skipped (partial updates are legal, §4.1 "Siblings are
/// applied independently").
pub fn check_rules(obj: &serde_json::Map<String, Value>, rules: &[ValidationRule]) -> Result<(), NodeError> {
    for rule in rules {
        let Some(value) = obj.get(rule.field) else {
            continue;
        };
        check_one(rule.field, value, rule.rule)?;
    }
    Ok(())
}

/// Same as [`check_rules`] but for a node whose wire value is a bare scalar
/// rather than a JSON object (`digital_zoom`, `exposure_mode`,
/// `image_rotation`, ...). `rule.field` is used only to label the error.
pub fn check_scalar_rules(value: &Value, rules: &[ValidationRule]) -> Result<(), NodeError> {
    for rule in rules {
        check_one(rule.field, value, rule.rule)?;
    }
    Ok(())
}

fn check_one(field: &'static str, value: &Value, rule: RuleKind) -> Result<(), NodeError> {
    match rule {
        RuleKind::Type(t) => {
            if !t.matches(value) {
                return Err(NodeError::new(
                    field,
                    format!("not of type {}", t.name()),
                    NodeErrorCode::InvalidArgument,
                ));
            }
        }
        RuleKind::Ge(v) | RuleKind::Gt(v) | RuleKind::Le(v) | RuleKind::Lt(v) | RuleKind::Ne(v) => {
            let Some(n) = value.as_f64() else {
                return Err(NodeError::new(field, "not a number", NodeErrorCode::InvalidArgument));
            };
            let (rejected, symbol) = match rule {
                RuleKind::Ge(_) => (n < v, "not >="),
                RuleKind::Gt(_) => (n <= v, "not >"),
                RuleKind::Le(_) => (n > v, "not <="),
                RuleKind::Lt(_) => (n >= v, "not <"),
                RuleKind::Ne(_) => (n == v, "not !="),
                RuleKind::Type(_) => unreachable!(),
            };
            if rejected {
                return Err(NodeError::new(field, format!("{symbol} {v}"), NodeErrorCode::OutOfRange));
            }
        }
    }
    Ok(())
}

/// Absolute tolerance used to decide whether a field "changed" (§9).
pub const FLOAT_TOLERANCE: f64 = 1e-8;

/// Recursive JSON equality with a float tolerance on numbers (§4.1 "Float
/// comparisons use an absolute tolerance of 10^-8").
pub fn approx_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() <= FLOAT_TOLERANCE,
            _ => x == y,
        },
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| approx_eq(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| approx_eq(v, w))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ge_rejects_below() {
        let obj = json!({"x": 0.5}).as_object().unwrap().clone();
        let err = check_rules(&obj, &[ValidationRule::ge("x", 1.0)]).unwrap_err();
        assert_eq!(err.code, NodeErrorCode::OutOfRange);
    }

    #[test]
    fn type_rejects_wrong_kind() {
        let obj = json!({"x": "nope"}).as_object().unwrap().clone();
        let err =
            check_rules(&obj, &[ValidationRule::of_type("x", JsonType::Number)]).unwrap_err();
        assert_eq!(err.code, NodeErrorCode::InvalidArgument);
    }

    #[test]
    fn missing_field_is_skipped() {
        let obj = json!({}).as_object().unwrap().clone();
        assert!(check_rules(&obj, &[ValidationRule::ge("x", 1.0)]).is_ok());
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        assert!(approx_eq(&json!(1.0), &json!(1.0 + 1e-9)));
        assert!(!approx_eq(&json!(1.0), &json!(1.0 + 1e-6)));
    }

    proptest::proptest! {
        #[test]
        fn approx_eq_is_reflexive(x in -1e6f64..1e6) {
            proptest::prop_assert!(approx_eq(&serde_json::json!(x), &serde_json::json!(x)));
        }
    }
}
