// SPDX-License-Identifier: MIT

//! In-memory implementations of the engine's boundary traits
//! (`SensorDriver`, `Transport`, `ExportSink`, `UserCallbacks`). Production
//! deployments back these with the vendor sensor SDK and the real
//! event/cloud transport; this module gives the binary something to run
//! against out of the box, and gives `edge-engine`'s integration tests a
//! deterministic double.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;

use edge_core::sensor::{Frame, SensorCoreHandle, SensorErrorCause};
use edge_core::transport::{ConfigurationCallback, TransportError, TransportEvent};
use edge_core::{ExportError, ExportKind, ExportSink, SensorDriver, SensorError, StreamHandle, Subframe, Transport, UserCallbacks};
use serde_json::Value;

/// A property store plus a fixed `last_error` cause, enough to exercise
/// every `pq_settings`/`port_settings` code path without real hardware.
pub struct InMemorySensor {
    properties: Mutex<HashMap<String, Value>>,
    last_error: Mutex<SensorErrorCause>,
}

impl Default for InMemorySensor {
    fn default() -> Self {
        InMemorySensor { properties: Mutex::new(HashMap::new()), last_error: Mutex::new(SensorErrorCause::Other("none".into())) }
    }
}

impl SensorDriver for InMemorySensor {
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
        self.last_error.lock().unwrap().clone()
    }
}

/// Pumps no real events; `process_event` always reports `Processed` unless
/// `request_exit` has been called, letting a test or a `SIGTERM` handler
/// push the engine toward `Destroying`.
pub struct LoopbackTransport {
    callback: Mutex<Option<ConfigurationCallback>>,
    should_exit: AtomicBool,
    sent_states: Mutex<Vec<Vec<u8>>>,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        LoopbackTransport { callback: Mutex::new(None), should_exit: AtomicBool::new(false), sent_states: Mutex::new(Vec::new()) }
    }
}

impl LoopbackTransport {
    pub fn request_exit(&self) {
        self.should_exit.store(true, Ordering::SeqCst);
    }

    /// Delivers a configuration document to the registered callback, as if
    /// it had arrived from the cloud (used by tests and by a local config
    /// file watcher in a fuller deployment).
    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        if let Some(cb) = self.callback.lock().unwrap().as_ref() {
            cb(topic, payload);
        }
    }

    pub fn sent_states(&self) -> Vec<Vec<u8>> {
        self.sent_states.lock().unwrap().clone()
    }
}

impl Transport for LoopbackTransport {
    fn set_configuration_callback(&self, callback: ConfigurationCallback) -> Result<(), TransportError> {
        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn process_event(&self, timeout_ms: u32) -> Result<TransportEvent, TransportError> {
        std::thread::sleep(std::time::Duration::from_millis(timeout_ms.min(20) as u64));
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

/// Synchronous, never-pending export sink: every send "completes"
/// immediately, so `CoolingDown`'s drain loop never blocks.
#[derive(Default)]
pub struct NullExportSink;

impl ExportSink for NullExportSink {
    fn send_sync(
        &self,
        _kind: ExportKind,
        _data: &[u8],
        _properties: &Value,
        _timestamp_ns: u64,
        _subframe: Subframe,
    ) -> Result<(), ExportError> {
        Ok(())
    }

    fn has_pending_operations(&self) -> bool {
        false
    }
}

/// Counts each callback invocation; every hook succeeds unless a specific
/// one has been poisoned via `fail_next_*`, which integration tests use to
/// drive the `onStart`/`onIterate` failure paths (§8 S4).
#[derive(Default)]
pub struct CountingCallbacks {
    pub on_create_calls: AtomicI32,
    pub on_start_calls: AtomicI32,
    pub on_iterate_calls: AtomicI32,
    pub on_stop_calls: AtomicI32,
    pub on_destroy_calls: AtomicI32,
    fail_on_start: AtomicBool,
    fail_on_iterate: AtomicBool,
}

impl CountingCallbacks {
    pub fn fail_next_on_start(&self) {
        self.fail_on_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_on_iterate(&self, fail: bool) {
        self.fail_on_iterate.store(fail, Ordering::SeqCst);
    }
}

impl UserCallbacks for CountingCallbacks {
    fn on_create(&self) -> i32 {
        self.on_create_calls.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn on_start(&self) -> i32 {
        self.on_start_calls.fetch_add(1, Ordering::SeqCst);
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
        self.on_stop_calls.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn on_destroy(&self) -> i32 {
        self.on_destroy_calls.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn on_configure(&self, _topic: &str, _value: &[u8]) -> i32 {
        0
    }
}
