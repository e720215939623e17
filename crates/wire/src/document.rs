// SPDX-License-Identifier: MIT

use edge_core::response_code::ResInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EnvelopeError;

/// Upper bound on `ai_models` entries (§3.1: "a list of at most N entries
/// (N=4)").
pub const MAX_AI_MODELS: usize = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReqInfo {
    pub req_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiModelEntry {
    pub name: String,
    pub target: String,
    pub url_path: String,
    pub hash: String,
    pub ai_model_bundle_id: String,
}

/// The configuration document as delivered by the cloud (§6.4). Parsed in
/// two steps: first a cheap envelope check (`parse_envelope`, mirroring
/// `configurationCallback` step 1), then handed whole to the DTDL model for
/// verify+apply once the engine is ready to consume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub req_info: ReqInfo,
    #[serde(default)]
    pub common_settings: Value,
    #[serde(default)]
    pub custom_settings: Value,
    #[serde(default)]
    pub ai_models: Vec<AiModelEntry>,
}

impl ConfigDocument {
    /// Validates the envelope (non-object rejected, `req_info.req_id`
    /// required) without yet validating any `common_settings` field. This
    /// is deliberately cheap: `configurationCallback` (§4.4) runs on a
    /// transport-owned thread and must not perform long work.
    pub fn parse_envelope(bytes: &[u8]) -> Result<ConfigDocument, EnvelopeError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| EnvelopeError::InvalidJson(e.to_string()))?;
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject);
        }
        let req_id = value
            .get("req_info")
            .and_then(|v| v.get("req_id"))
            .and_then(|v| v.as_str());
        if req_id.is_none() {
            return Err(EnvelopeError::MissingReqId);
        }
        serde_json::from_value(value).map_err(|e| EnvelopeError::InvalidJson(e.to_string()))
    }

    pub fn ai_models_truncated(&self) -> bool {
        self.ai_models.len() > MAX_AI_MODELS
    }
}

/// The response document (§6.4): the input echoed back with `res_info`
/// filled in. `custom_settings` is echoed verbatim (§7.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDocument {
    pub req_info: ReqInfo,
    pub res_info: ResInfo,
    pub common_settings: Value,
    pub custom_settings: Value,
    pub ai_models: Vec<AiModelEntry>,
}
