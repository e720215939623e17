// SPDX-License-Identifier: MIT

use std::sync::Arc;

use edge_daemon::env;
use edge_daemon::testsupport::{CountingCallbacks, InMemorySensor, LoopbackTransport, NullExportSink};
use edge_engine::{run, Boundary, Context};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(env::log_filter())).init();

    let transport = Arc::new(LoopbackTransport::default());
    let boundary = Boundary {
        sensor: Arc::new(InMemorySensor::default()),
        transport: transport.clone(),
        export: Arc::new(NullExportSink),
        callbacks: Arc::new(CountingCallbacks::default()),
        stream_key: env::stream_key(),
    };

    // Shutdown is driven entirely by the transport's `ShouldExit` sentinel
    // (§5); a Ctrl-C/SIGTERM just flips that flag so the running state
    // machine observes it on its next `process_event` poll.
    let shutdown_transport = transport.clone();
    ctrlc::set_handler(move || shutdown_transport.request_exit())
        .expect("failed to install SIGINT/SIGTERM handler");

    let ctx = Arc::new(Context::new(boundary));
    run(ctx);
}
