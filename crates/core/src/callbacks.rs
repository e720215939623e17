// SPDX-License-Identifier: MIT

//! User-supplied callbacks (§6.1). All synchronous; 0 = success, non-zero
//! = failure, matching the source's C ABI convention rather than `Result`
//! — these are invoked across the user-application boundary and the
//! engine's job is exactly to interpret that integer, not to hide it.

pub trait UserCallbacks: Send + Sync {
    fn on_create(&self) -> i32;
    fn on_start(&self) -> i32;
    fn on_iterate(&self) -> i32;
    fn on_stop(&self) -> i32;
    fn on_destroy(&self) -> i32;
    fn on_configure(&self, topic: &str, value: &[u8]) -> i32;
}
