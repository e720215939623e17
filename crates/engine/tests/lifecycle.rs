// SPDX-License-Identifier: MIT

//! End-to-end lifecycle scenarios against in-memory boundary fakes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{wait_until, FakeCallbacks, FakeExport, FakeSensor, FakeTransport};
use edge_core::LifecycleState;
use edge_engine::{run, Boundary, Context};
use serde_json::{json, Value};

struct Harness {
    ctx: Arc<Context>,
    transport: Arc<FakeTransport>,
    callbacks: Arc<FakeCallbacks>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Harness {
    fn spawn() -> Self {
        let transport = Arc::new(FakeTransport::default());
        let callbacks = Arc::new(FakeCallbacks::default());
        let boundary = Boundary {
            sensor: Arc::new(FakeSensor::default()),
            transport: transport.clone(),
            export: Arc::new(FakeExport),
            callbacks: callbacks.clone(),
            stream_key: "test-stream".into(),
        };
        let ctx = Arc::new(Context::new(boundary));
        let run_ctx = ctx.clone();
        let handle = std::thread::spawn(move || run(run_ctx));
        Self { ctx, transport, callbacks, handle: Some(handle) }
    }

    fn deliver(&self, req_id: &str, body: Value) {
        let mut doc = body;
        doc["req_info"] = json!({"req_id": req_id});
        self.transport.deliver("state", serde_json::to_vec(&doc).unwrap().as_slice());
    }

    fn wait_for_state(&self, state: LifecycleState) -> bool {
        wait_until(|| self.ctx.current() == state, Duration::from_secs(2))
    }

    fn last_response(&self) -> Value {
        let bytes = self.transport.sent_states().last().cloned().expect("no state sent yet");
        serde_json::from_slice(&bytes).unwrap()
    }

    fn shutdown(mut self) {
        self.transport.request_exit();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.transport.request_exit();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

#[test]
fn s1_happy_path_create_idle_apply_run_stop_destroy() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    h.deliver("R1", json!({"common_settings": {"process_state": 1, "log_level": 2}}));
    assert!(wait_until(|| h.last_response()["res_info"]["res_id"] == "R1", Duration::from_secs(2)));
    let resp = h.last_response();
    assert_eq!(resp["res_info"]["code"], 0);

    h.deliver("R2", json!({"common_settings": {"process_state": 2}}));
    assert!(h.wait_for_state(LifecycleState::Running));
    assert_eq!(h.ctx.dtdl.lock().to_response().common_settings["process_state"], 2);

    h.deliver("R3", json!({"common_settings": {"process_state": 1}}));
    assert!(h.wait_for_state(LifecycleState::Idle));
    assert_eq!(h.ctx.dtdl.lock().to_response().common_settings["process_state"], 1);

    h.shutdown();
}

#[test]
fn s2_invalid_field_range_is_rejected() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    h.deliver("R1", json!({"common_settings": {"pq_settings": {"digital_zoom": -5.0}}}));
    assert!(wait_until(|| h.last_response()["res_info"]["res_id"] == "R1", Duration::from_secs(2)));
    let resp = h.last_response();
    assert_eq!(resp["res_info"]["code"], 3); // INVALID_ARGUMENT
    assert_eq!(h.ctx.current(), LifecycleState::Idle);

    h.shutdown();
}

#[test]
fn s3_port_settings_change_during_running_is_ignored() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    h.deliver("R1", json!({"common_settings": {"process_state": 2}}));
    assert!(h.wait_for_state(LifecycleState::Running));

    h.deliver("R2", json!({"common_settings": {"port_settings": {"input_tensor": {"enabled": true}}}}));
    assert!(wait_until(|| h.last_response()["res_info"]["res_id"] == "R2", Duration::from_secs(2)));
    let resp = h.last_response();
    assert_eq!(resp["res_info"]["code"], 9); // FAILED_PRECONDITION
    assert!(resp["res_info"]["detail_msg"].as_str().unwrap().contains("Running"));
    assert_eq!(h.ctx.current(), LifecycleState::Running);

    h.shutdown();
}

#[test]
fn s4_on_start_failure_recovers_to_idle() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    h.callbacks.fail_next_on_start();
    h.deliver("R1", json!({"common_settings": {"process_state": 2}}));

    assert!(h.wait_for_state(LifecycleState::Idle));
    let res_info = h.ctx.dtdl.lock().res_info().clone();
    assert_eq!(res_info.code, edge_core::ResponseCode::FailedPrecondition);
    assert!(res_info.detail_msg.contains("onStart"));

    h.shutdown();
}

#[test]
fn s5_bounded_iterations_transition_through_cooling_down() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    h.deliver("R1", json!({"common_settings": {"inference_settings": {"number_of_iterations": 4}}}));
    assert!(wait_until(|| h.last_response()["res_info"]["res_id"] == "R1", Duration::from_secs(2)));

    h.deliver("R2", json!({"common_settings": {"process_state": 2}}));
    assert!(h.wait_for_state(LifecycleState::Running));

    assert!(wait_until(|| h.ctx.current() == LifecycleState::Idle, Duration::from_secs(3)));
    assert!(h.callbacks.on_iterate_calls.load(std::sync::atomic::Ordering::SeqCst) >= 1);

    // I5: process_state must track the engine back down to IDLE, not stay
    // stuck reporting RUNNING after the bounded worker run completes.
    assert!(wait_until(
        || h.last_response()["common_settings"]["process_state"] == 1,
        Duration::from_secs(2)
    ));

    h.shutdown();
}

#[test]
fn s6_feasibility_rejection_keeps_next_unchanged() {
    let h = Harness::spawn();
    assert!(h.wait_for_state(LifecycleState::Idle));

    let accepted = h.ctx.request_transition(LifecycleState::CoolingDown);
    assert!(!accepted);
    assert_eq!(h.ctx.next(), LifecycleState::Idle);

    h.shutdown();
}
