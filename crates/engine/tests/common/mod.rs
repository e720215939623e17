// SPDX-License-Identifier: MIT

//! Shared in-memory fakes for the engine's integration tests (§8 S1-S6).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;

use edge_core::sensor::{Frame, SensorCoreHandle, SensorErrorCause};
use edge_core::transport::{ConfigurationCallback, TransportError, TransportEvent};
use edge_core::{ExportError, ExportKind, ExportSink, SensorDriver, SensorError, StreamHandle, Subframe, Transport, UserCallbacks};
use serde_json::Value;

#[derive(Default)]
pub struct FakeSensor {
    properties: Mutex<HashMap<String, Value>>,
}

impl SensorDriver for FakeSensor {
    fn core_init(&self) -> Result<SensorCoreHandle, SensorError> {
        Ok(SensorCoreHandle(1))
    }
    fn core_exit(&self, _core: SensorCoreHandle) -> Result<(), SensorError> {
        Ok(())
    }
    fn open_stream(&self, _core: SensorCoreHandle, _stream_key: &str) -> Result<StreamHandle, SensorError> {
        Ok(StreamHandle(1))
    }
    fn close_stream(&self, _core: SensorCoreHandle, _stream: StreamHandle) -> Result<(), SensorError> {
        Ok(())
    }
    fn get_property(&self, _stream: StreamHandle, property: &str) -> Result<Value, SensorError> {
        Ok(self.properties.lock().unwrap().get(property).cloned().unwrap_or(Value::Null))
    }
    fn set_property(&self, _stream: StreamHandle, property: &str, value: &Value) -> Result<(), SensorError> {
        self.properties.lock().unwrap().insert(property.to_string(), value.clone());
        Ok(())
    }
    fn get_frame(&self, _stream: StreamHandle, _timeout_ms: u32) -> Result<Frame, SensorError> {
        Err(SensorError::Timeout)
    }
    fn release_frame(&self, _stream: StreamHandle, _frame: Frame) -> Result<(), SensorError> {
        Ok(())
    }
    fn last_error(&self) -> SensorErrorCause {
        SensorErrorCause::Other("n/a".into())
    }
}

#[derive(Default)]
pub struct FakeTransport {
    callback: Mutex<Option<ConfigurationCallback>>,
    should_exit: AtomicBool,
    sent_states: Mutex<Vec<Vec<u8>>>,
}

impl FakeTransport {
    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        if let Some(cb) = self.callback.lock().unwrap().as_ref() {
            cb(topic, payload);
        }
    }

    pub fn request_exit(&self) {
        self.should_exit.store(true, Ordering::SeqCst);
    }

    pub fn sent_states(&self) -> Vec<Vec<u8>> {
        self.sent_states.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn set_configuration_callback(&self, callback: ConfigurationCallback) -> Result<(), TransportError> {
        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn process_event(&self, timeout_ms: u32) -> Result<TransportEvent, TransportError> {
        std::thread::sleep(std::time::Duration::from_millis(timeout_ms.min(5) as u64));
        if self.should_exit.load(Ordering::SeqCst) {
            Ok(TransportEvent::ShouldExit)
        } else {
            Ok(TransportEvent::Processed)
        }
    }

    fn send_state(&self, _topic: &str, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent_states.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn blob_operation(&self, _url_path: &str) -> Result<(), TransportError> {
        Ok(())
    }

    fn send_telemetry(&self, _entries: &[(String, String)]) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeExport;

impl ExportSink for FakeExport {
    fn send_sync(&self, _kind: ExportKind, _data: &[u8], _properties: &Value, _timestamp_ns: u64, _subframe: Subframe) -> Result<(), ExportError> {
        Ok(())
    }
    fn has_pending_operations(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub struct FakeCallbacks {
    pub on_iterate_calls: AtomicI32,
    fail_on_start: AtomicBool,
    fail_on_iterate: AtomicBool,
}

impl FakeCallbacks {
    pub fn fail_next_on_start(&self) {
        self.fail_on_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_on_iterate(&self, fail: bool) {
        self.fail_on_iterate.store(fail, Ordering::SeqCst);
    }
}

impl UserCallbacks for FakeCallbacks {
    fn on_create(&self) -> i32 {
        0
    }
    fn on_start(&self) -> i32 {
        if self.fail_on_start.swap(false, Ordering::SeqCst) {
            -1
        } else {
            0
        }
    }
    fn on_iterate(&self) -> i32 {
        self.on_iterate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_iterate.load(Ordering::SeqCst) {
            -1
        } else {
            0
        }
    }
    fn on_stop(&self) -> i32 {
        0
    }
    fn on_destroy(&self) -> i32 {
        0
    }
    fn on_configure(&self, _topic: &str, _value: &[u8]) -> i32 {
        0
    }
}

pub fn wait_until(mut cond: impl FnMut() -> bool, timeout: std::time::Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    cond()
}
