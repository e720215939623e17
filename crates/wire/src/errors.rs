// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Envelope-level rejection (§4.4 callback step 1): not valid JSON, not an
/// object, or missing `req_info.req_id`.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("req_info.req_id is missing or not a string")]
    MissingReqId,
}
