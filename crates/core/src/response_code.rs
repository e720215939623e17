// SPDX-License-Identifier: MIT

//! Response-code taxonomy (§7.1). Closed set, serialized as the small
//! integer the cloud side expects in `res_info.code`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Per-apply outcome code reported in `res_info.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Default for ResponseCode {
    fn default() -> Self {
        ResponseCode::Ok
    }
}

impl Serialize for ResponseCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        ResponseCode::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown response code {value}")))
    }
}

impl ResponseCode {
    fn from_u8(value: u8) -> Option<Self> {
        use ResponseCode::*;
        Some(match value {
            0 => Ok,
            1 => Cancelled,
            2 => Unknown,
            3 => InvalidArgument,
            4 => DeadlineExceeded,
            5 => NotFound,
            6 => AlreadyExists,
            7 => PermissionDenied,
            8 => ResourceExhausted,
            9 => FailedPrecondition,
            10 => Aborted,
            11 => OutOfRange,
            12 => Unimplemented,
            13 => Internal,
            14 => Unavailable,
            15 => DataLoss,
            16 => Unauthenticated,
            _ => return None,
        })
    }
}

/// The outcome of validating or applying one property node, carried up
/// through composite nodes until it reaches `res_info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResInfo {
    #[serde(default)]
    pub code: ResponseCode,
    #[serde(default)]
    pub res_id: String,
    #[serde(default)]
    pub detail_msg: String,
}

impl ResInfo {
    pub fn ok(res_id: impl Into<String>) -> Self {
        ResInfo {
            code: ResponseCode::Ok,
            res_id: res_id.into(),
            detail_msg: String::new(),
        }
    }

    pub fn fail(res_id: impl Into<String>, code: ResponseCode, detail: impl Into<String>) -> Self {
        ResInfo {
            code,
            res_id: res_id.into(),
            detail_msg: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.code, ResponseCode::Ok)
    }
}
