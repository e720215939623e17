// SPDX-License-Identifier: MIT

//! The state-machine context (C4): the single owning handle created once
//! at startup and shared (by reference) with every state object, the
//! configuration callback, and the worker thread (§9 "singleton context" —
//! expressed here as one `Context` owned by `main` rather than a
//! process-wide global).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use edge_core::response_code::ResInfo;
use edge_core::sensor::SensorCoreHandle;
use edge_core::{ExportSink, LifecycleState, ResponseCode, SensorDriver, StreamHandle, Transport, UserCallbacks};
use edge_dtdl::DtdlModel;
use parking_lot::Mutex;

use crate::worker::Worker;

/// The boundary collaborators a running engine needs (§1, §6). Grouped so
/// `Context::new` takes one argument instead of four.
pub struct Boundary {
    pub sensor: Arc<dyn SensorDriver>,
    pub transport: Arc<dyn Transport>,
    pub export: Arc<dyn ExportSink>,
    pub callbacks: Arc<dyn UserCallbacks>,
    pub stream_key: String,
}

pub struct Context {
    pub sensor: Arc<dyn SensorDriver>,
    pub transport: Arc<dyn Transport>,
    pub export: Arc<dyn ExportSink>,
    pub callbacks: Arc<dyn UserCallbacks>,
    pub stream_key: String,

    pub dtdl: Mutex<DtdlModel>,
    pub core_handle: Mutex<Option<SensorCoreHandle>>,
    pub stream_handle: Mutex<Option<StreamHandle>>,
    pending_configuration: Mutex<Option<Vec<u8>>>,
    notify: AtomicBool,
    current: Mutex<LifecycleState>,
    next: Mutex<LifecycleState>,
    /// Guards the sensor-core-init / open-stream / onCreate sequence so it
    /// runs exactly once across every `Applying` entry, not once per
    /// construction (§4.2.2 "module-scoped is_initialized flag").
    applying_initialized: AtomicBool,
    pub worker: Worker,
}

impl Context {
    pub fn new(boundary: Boundary) -> Self {
        Context {
            sensor: boundary.sensor,
            transport: boundary.transport,
            export: boundary.export,
            callbacks: boundary.callbacks,
            stream_key: boundary.stream_key,
            dtdl: Mutex::new(DtdlModel::new()),
            core_handle: Mutex::new(None),
            stream_handle: Mutex::new(None),
            pending_configuration: Mutex::new(None),
            notify: AtomicBool::new(false),
            current: Mutex::new(LifecycleState::Creating),
            next: Mutex::new(LifecycleState::Creating),
            applying_initialized: AtomicBool::new(false),
            worker: Worker::new(),
        }
    }

    pub fn current(&self) -> LifecycleState {
        *self.current.lock()
    }

    pub fn next(&self) -> LifecycleState {
        *self.next.lock()
    }

    /// Commits a completed transition: `current` becomes the just-built
    /// state's kind. Called once by the core loop right after construction
    /// of the new state object (§4.3 step 3). Mirrors the original
    /// `StateMachineContext::SetCurrentState`, which syncs
    /// `common_settings.process_state` to the new state in the same place
    /// (§4.4, I5) — done here rather than in each state's constructor so
    /// every transition, not just ones a particular state remembers to
    /// handle, keeps the invariant.
    pub fn commit_current(&self, state: LifecycleState) {
        *self.current.lock() = state;
        self.dtdl.lock().sync_process_state(state);
    }

    /// Unchecked transition request, used by the engine itself (a state's
    /// own `iterate`, the worker thread) rather than by an external
    /// configuration request, which must go through
    /// [`Context::request_transition`]'s feasibility check (§4.4).
    pub fn set_next(&self, state: LifecycleState) {
        *self.next.lock() = state;
    }

    /// The configurator (C6): accepts a transition request iff the
    /// feasibility table allows `current -> new` (§4.4, §6.3).
    pub fn request_transition(&self, new: LifecycleState) -> bool {
        let mut next = self.next.lock();
        if *next == new {
            return true;
        }
        let current = self.current();
        if edge_core::is_feasible(current, new) {
            *next = new;
            drop(next);
            self.mark_notify();
            true
        } else {
            false
        }
    }

    pub fn mark_notify(&self) {
        self.notify.store(true, Ordering::SeqCst);
    }

    pub fn take_notify(&self) -> bool {
        self.notify.swap(false, Ordering::SeqCst)
    }

    /// Stages a configuration document, releasing whatever was pending
    /// before (§4.4 step 2, §8 P3: at most one pending document at a
    /// time, coalescing to the last delivery).
    pub fn stage_configuration(&self, bytes: Vec<u8>) {
        *self.pending_configuration.lock() = Some(bytes);
    }

    pub fn take_pending_configuration(&self) -> Option<Vec<u8>> {
        self.pending_configuration.lock().take()
    }

    pub fn applying_initialized(&self) -> bool {
        self.applying_initialized.load(Ordering::SeqCst)
    }

    pub fn set_applying_initialized(&self) {
        self.applying_initialized.store(true, Ordering::SeqCst);
    }

    /// Records a state-level failure in `res_info` without going through
    /// the property-node apply path (§7.1 `CallbackFailure`/`SensorError`).
    pub fn fail(&self, code: ResponseCode, detail: impl Into<String>) {
        let mut dtdl = self.dtdl.lock();
        let res_id = dtdl.res_info().res_id.clone();
        let failure = ResInfo::fail(res_id, code, detail);
        dtdl.set_res_info(failure);
    }

    pub fn current_stream(&self) -> Option<StreamHandle> {
        *self.stream_handle.lock()
    }
}
