// SPDX-License-Identifier: MIT

//! The `RUNNING` worker thread (C8): plain mutex+condvar over a 3-state
//! command variable, deliberately not channels (§9 "do not over-engineer
//! with channels").

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Uninitialized,
    Running,
    Exit,
}

struct Shared {
    command: Mutex<Command>,
    condvar: Condvar,
}

pub struct Worker {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Worker {
    fn default() -> Self {
        Worker::new()
    }
}

impl Worker {
    pub fn new() -> Self {
        Worker {
            shared: Arc::new(Shared { command: Mutex::new(Command::Uninitialized), condvar: Condvar::new() }),
            handle: Mutex::new(None),
        }
    }

    /// Spawns the worker thread and blocks until it has observed the
    /// initial `RUNNING` command (§4.5 `start_thread`).
    pub fn start(&self, ctx: Arc<Context>, number_of_iterations: u32) {
        let shared = Arc::clone(&self.shared);
        *shared.command.lock() = Command::Running;

        let thread_shared = Arc::clone(&shared);
        let join = std::thread::spawn(move || worker_main(ctx, thread_shared, number_of_iterations));
        *self.handle.lock() = Some(join);

        shared.condvar.notify_all();
        let mut command = shared.command.lock();
        while *command == Command::Uninitialized {
            shared.condvar.wait(&mut command);
        }
    }

    /// Sets the command to `EXIT` and joins with a 60 s cap, pumping
    /// `transport.processEvent` while waiting so synchronous exports inside
    /// the worker keep making progress (§4.5, §9 "pump transport while
    /// waiting to join" is load-bearing).
    pub fn stop(&self, ctx: &Context) {
        *self.shared.command.lock() = Command::Exit;
        self.shared.condvar.notify_all();

        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut done = handle.is_finished();
        while !done && Instant::now() < deadline {
            let _ = ctx.transport.process_event(1000);
            done = handle.is_finished();
        }
        if done {
            let _ = handle.join();
        }
        // else: 60 s elapsed without the worker observing EXIT; the OS
        // thread is orphaned, but shutdown proceeds regardless (§4.5).
    }
}

fn worker_main(ctx: Arc<Context>, shared: Arc<Shared>, number_of_iterations: u32) {
    {
        let mut command = shared.command.lock();
        if *command == Command::Uninitialized {
            *command = Command::Running;
        }
        shared.condvar.notify_all();
    }

    let mut count: u32 = 0;
    loop {
        if *shared.command.lock() == Command::Exit {
            break;
        }
        if let Err(err) = crate::facade::run_once(&ctx) {
            ctx.fail(edge_core::ResponseCode::FailedPrecondition, format!("sensor/export failure: {err}"));
            ctx.set_next(edge_core::LifecycleState::Idle);
            break;
        }
        let res = ctx.callbacks.on_iterate();
        if res != 0 {
            ctx.fail(edge_core::ResponseCode::FailedPrecondition, format!("onIterate call gave error res={res}"));
            ctx.set_next(edge_core::LifecycleState::Idle);
            break;
        }
        if *shared.command.lock() == Command::Exit {
            break;
        }
        if number_of_iterations != 0 {
            count += 1;
            if count >= number_of_iterations {
                ctx.set_next(edge_core::LifecycleState::CoolingDown);
                break;
            }
        }
    }
}
