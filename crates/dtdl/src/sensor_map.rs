// SPDX-License-Identifier: MIT

//! Maps a sensor-driver failure onto a response code (§7.1 "SensorError").

use edge_core::{ResponseCode, SensorError, SensorErrorCause};

/// `None` means "leave `res_info.code` as last set" (§7.1: "other -> carry
/// the sensor message in `detail_msg`; code left as last set").
pub fn code_for_cause(cause: &SensorErrorCause) -> Option<ResponseCode> {
    match cause {
        SensorErrorCause::OutOfRange => Some(ResponseCode::OutOfRange),
        SensorErrorCause::InvalidCameraOperationParameter => Some(ResponseCode::InvalidArgument),
        // TIMEOUT is only non-fatal inside getFrame (§4.6); a property
        // write timing out falls into the unmapped "other" bucket.
        SensorErrorCause::Timeout | SensorErrorCause::Other(_) => None,
    }
}

pub fn message_for_error(err: &SensorError) -> String {
    err.to_string()
}
