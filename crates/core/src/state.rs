// SPDX-License-Identifier: MIT

//! Lifecycle state enum (closed set, §3.1 of the spec).

use serde::{Deserialize, Serialize};

/// One of the seven lifecycle states the engine can be in.
///
/// Discriminants match the row/column order of the feasibility table in
/// `feasibility.rs` (`CRT IDL RUN DST EXT CLD APL`) — do not reorder these
/// without updating the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Creating = 0,
    Idle = 1,
    Running = 2,
    Destroying = 3,
    Exiting = 4,
    CoolingDown = 5,
    Applying = 6,
}

impl LifecycleState {
    pub const COUNT: usize = 7;

    pub const ALL: [LifecycleState; Self::COUNT] = [
        LifecycleState::Creating,
        LifecycleState::Idle,
        LifecycleState::Running,
        LifecycleState::Destroying,
        LifecycleState::Exiting,
        LifecycleState::CoolingDown,
        LifecycleState::Applying,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps the `common_settings.process_state` wire enum (`1=IDLE,
    /// 2=RUNNING, 3=DESTROYING`) onto a lifecycle state. Returns `None` for
    /// values outside the closed set (the caller should treat this the same
    /// way the source treats its "unknown state" branch: log and fall back).
    pub fn from_process_state(value: u32) -> Option<LifecycleState> {
        match value {
            1 => Some(LifecycleState::Idle),
            2 => Some(LifecycleState::Running),
            3 => Some(LifecycleState::Destroying),
            _ => None,
        }
    }

    /// Inverse of `from_process_state`, for states that are legal to report
    /// back to the cloud as `process_state` (only `IDLE`/`RUNNING` — see
    /// `CommonSettings::SetProcessState` in the original source, which
    /// avoids ever sending a transient state).
    pub fn to_process_state(self) -> Option<u32> {
        match self {
            LifecycleState::Idle => Some(1),
            LifecycleState::Running => Some(2),
            LifecycleState::Destroying => Some(3),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Creating => "creating",
            LifecycleState::Idle => "idle",
            LifecycleState::Running => "running",
            LifecycleState::Destroying => "destroying",
            LifecycleState::Exiting => "exiting",
            LifecycleState::CoolingDown => "cooling_down",
            LifecycleState::Applying => "applying",
        };
        f.write_str(s)
    }
}
