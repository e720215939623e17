// SPDX-License-Identifier: MIT

use edge_core::ResponseCode;
use thiserror::Error;

/// Verification failure for one property node (§4.1 `verify`). Carries
/// enough to fill `res_info.detail_msg`/`res_info.code` directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field} {message}")]
pub struct NodeError {
    pub field: String,
    pub message: String,
    pub code: NodeErrorCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeErrorCode {
    InvalidArgument,
    OutOfRange,
}

impl From<NodeErrorCode> for ResponseCode {
    fn from(code: NodeErrorCode) -> Self {
        match code {
            NodeErrorCode::InvalidArgument => ResponseCode::InvalidArgument,
            NodeErrorCode::OutOfRange => ResponseCode::OutOfRange,
        }
    }
}

impl NodeError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: NodeErrorCode) -> Self {
        NodeError {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}
