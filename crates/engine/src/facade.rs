// SPDX-License-Identifier: MIT

//! Sensor/export façade (C9, §4.6): pulls one frame per worker iteration
//! and dispatches each enabled channel to the export sink. This is not a
//! user callback — it's the engine's own bookkeeping that runs around
//! `onIterate`, since the export boundary is only reachable through the
//! context the user callback never sees.

use std::sync::Arc;

use edge_core::sensor::{ChannelData, ChannelId, Frame};
use edge_core::{ExportKind, SensorError};
use serde_json::json;

use crate::context::Context;

/// Runs one pass of the façade. A `getFrame` timeout is non-fatal; other
/// sensor errors are surfaced to the caller as the worker's `onIterate`
/// failure path would be (§7.1).
pub fn run_once(ctx: &Arc<Context>) -> Result<(), String> {
    let (input_enabled, metadata_enabled) = {
        let dtdl = ctx.dtdl.lock();
        (dtdl.input_tensor_export_enabled(), dtdl.metadata_export_enabled())
    };
    if !input_enabled && !metadata_enabled {
        return Ok(());
    }

    let Some(stream) = ctx.current_stream() else {
        return Ok(());
    };

    let frame = match ctx.sensor.get_frame(stream, 5000) {
        Ok(frame) => frame,
        Err(SensorError::Timeout) => return Ok(()),
        Err(err) => return Err(err.to_string()),
    };

    if input_enabled {
        dispatch_channel(ctx, &frame, ChannelId::InferenceInputImage, ExportKind::InputTensor);
    }
    if metadata_enabled {
        dispatch_channel(ctx, &frame, ChannelId::InferenceOutput, ExportKind::Metadata);
    }

    ctx.sensor.release_frame(stream, frame).map_err(|err| err.to_string())
}

/// `(0, 0)` means no valid data for this piece; metadata is only ever
/// valid on the first subframe (§4.6 subframe policy).
fn dispatch_channel(ctx: &Arc<Context>, frame: &Frame, channel: ChannelId, kind: ExportKind) {
    let Some(data) = frame.channel(channel) else {
        return;
    };
    if data.subframe.is_empty() {
        return;
    }
    if matches!(kind, ExportKind::Metadata) && data.subframe.current != 1 {
        return;
    }

    let properties = channel_properties(data);
    if let Err(err) = ctx.export.send_sync(kind, &data.data, &properties, data.timestamp, data.subframe) {
        tracing::warn!(%err, ?kind, "export send failed");
    }
}

fn channel_properties(data: &ChannelData) -> serde_json::Value {
    match data.image {
        Some(geometry) => json!({"width": geometry.width, "height": geometry.height}),
        None => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Boundary, Context};
    use edge_core::sensor::{Frame, SensorCoreHandle, SensorErrorCause, StreamHandle, Subframe};
    use edge_core::transport::{ConfigurationCallback, TransportError, TransportEvent};
    use edge_core::{ExportError, Transport, UserCallbacks};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubSensor {
        frame: Mutex<Option<Frame>>,
    }
    impl edge_core::SensorDriver for StubSensor {
        fn core_init(&self) -> Result<SensorCoreHandle, SensorError> {
            Ok(SensorCoreHandle(1))
        }
        fn core_exit(&self, _core: SensorCoreHandle) -> Result<(), SensorError> {
            Ok(())
        }
        fn open_stream(&self, _core: SensorCoreHandle, _key: &str) -> Result<StreamHandle, SensorError> {
            Ok(StreamHandle(1))
        }
        fn close_stream(&self, _core: SensorCoreHandle, _stream: StreamHandle) -> Result<(), SensorError> {
            Ok(())
        }
        fn get_property(&self, _stream: StreamHandle, _property: &str) -> Result<Value, SensorError> {
            Ok(json!({}))
        }
        fn set_property(&self, _stream: StreamHandle, _property: &str, _value: &Value) -> Result<(), SensorError> {
            Ok(())
        }
        fn get_frame(&self, _stream: StreamHandle, _timeout_ms: u32) -> Result<Frame, SensorError> {
            self.frame.lock().unwrap().take().ok_or(SensorError::Timeout)
        }
        fn release_frame(&self, _stream: StreamHandle, _frame: Frame) -> Result<(), SensorError> {
            Ok(())
        }
        fn last_error(&self) -> SensorErrorCause {
            SensorErrorCause::Other("n/a".into())
        }
    }

    #[derive(Default)]
    struct NoopTransport;
    impl Transport for NoopTransport {
        fn set_configuration_callback(&self, _callback: ConfigurationCallback) -> Result<(), TransportError> {
            Ok(())
        }
        fn process_event(&self, _timeout_ms: u32) -> Result<TransportEvent, TransportError> {
            Ok(TransportEvent::Processed)
        }
        fn send_state(&self, _topic: &str, _bytes: &[u8]) -> Result<(), TransportError> {
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
    struct NoopCallbacks;
    impl UserCallbacks for NoopCallbacks {
        fn on_create(&self) -> i32 {
            0
        }
        fn on_start(&self) -> i32 {
            0
        }
        fn on_iterate(&self) -> i32 {
            0
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

    #[derive(Default)]
    struct CountingExport {
        sends: AtomicUsize,
    }
    impl edge_core::ExportSink for CountingExport {
        fn send_sync(
            &self,
            _kind: ExportKind,
            _data: &[u8],
            _properties: &Value,
            _timestamp_ns: u64,
            _subframe: Subframe,
        ) -> Result<(), ExportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn has_pending_operations(&self) -> bool {
            false
        }
    }

    fn test_context(sensor: Arc<StubSensor>, export: Arc<CountingExport>) -> Arc<Context> {
        let ctx = Context::new(Boundary {
            sensor,
            transport: Arc::new(NoopTransport),
            export,
            callbacks: Arc::new(NoopCallbacks),
            stream_key: "k".into(),
        });
        *ctx.stream_handle.lock() = Some(StreamHandle(1));
        Arc::new(ctx)
    }

    #[test]
    fn skips_frame_pull_when_no_channel_is_enabled() {
        let sensor = Arc::new(StubSensor::default());
        let export = Arc::new(CountingExport::default());
        let ctx = test_context(sensor, export.clone());
        assert!(run_once(&ctx).is_ok());
        assert_eq!(export.sends.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatches_enabled_channel_and_releases_the_frame() {
        let mut channels = std::collections::HashMap::new();
        channels.insert(
            ChannelId::InferenceInputImage,
            ChannelData { data: vec![1, 2, 3], timestamp: 42, subframe: Subframe { current: 1, division: 1 }, image: None },
        );
        let sensor = Arc::new(StubSensor { frame: Mutex::new(Some(Frame { handle: 1, channels })) });
        let export = Arc::new(CountingExport::default());
        let ctx = test_context(sensor, export.clone());
        let doc = edge_wire::ConfigDocument {
            req_info: edge_wire::ReqInfo { req_id: "r1".into() },
            common_settings: json!({"port_settings": {"input_tensor": {"enabled": true}}}),
            custom_settings: Value::Null,
            ai_models: Vec::new(),
        };
        ctx.dtdl.lock().apply(&doc, ctx.sensor.as_ref(), StreamHandle(1), edge_core::LifecycleState::Idle, ctx.callbacks.as_ref());
        assert!(run_once(&ctx).is_ok());
        assert_eq!(export.sends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metadata_is_skipped_past_the_first_subframe() {
        let mut channels = std::collections::HashMap::new();
        channels.insert(
            ChannelId::InferenceOutput,
            ChannelData { data: vec![1], timestamp: 1, subframe: Subframe { current: 2, division: 2 }, image: None },
        );
        let frame = Frame { handle: 1, channels };
        assert!(frame.channel(ChannelId::InferenceOutput).unwrap().subframe.current != 1);
    }

    #[test]
    fn empty_subframe_carries_no_valid_data() {
        assert!(Subframe::default().is_empty());
    }
}
