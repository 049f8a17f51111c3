//! The codec worker thread: the isolated execution context that owns the
//! backend module, the session pool and every session endpoint.
//!
//! The loop waits on the control channel and all registered session
//! endpoints at once and processes exactly one message to completion per
//! iteration. Handlers never suspend, so pool mutations are serialized with
//! the codec operations and need no locking.

mod handlers;

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, RecvError, Select, Sender};
use tracing::debug;

use voicewire_codec::{CodecModule, ModuleLoader};

use crate::config::EngineConfig;
use crate::endpoint::WorkerEndpoint;
use crate::events::EventHub;
use crate::pool::SessionPool;
use crate::protocol::{ControlRequest, SessionRequest};

pub(crate) struct CodecWorker {
    loader: Arc<dyn ModuleLoader>,
    module: Option<Box<dyn CodecModule>>,
    pool: SessionPool,
    endpoints: Vec<WorkerEndpoint>,
    events: Arc<EventHub>,
}

pub(crate) fn spawn(
    loader: Arc<dyn ModuleLoader>,
    config: EngineConfig,
    events: Arc<EventHub>,
) -> io::Result<(Sender<ControlRequest>, JoinHandle<()>)> {
    let (ctrl_tx, ctrl_rx) = crossbeam_channel::unbounded();
    let join = std::thread::Builder::new()
        .name("voicewire-codec-worker".to_string())
        .spawn(move || worker_main(loader, config, events, ctrl_rx))?;
    Ok((ctrl_tx, join))
}

fn worker_main(
    loader: Arc<dyn ModuleLoader>,
    config: EngineConfig,
    events: Arc<EventHub>,
    ctrl_rx: Receiver<ControlRequest>,
) {
    let mut worker = CodecWorker {
        loader,
        module: None,
        pool: SessionPool::new(config.pool_capacity),
        endpoints: Vec::new(),
        events,
    };
    debug!(capacity = worker.pool.capacity(), "codec worker started");

    loop {
        match next_message(&ctrl_rx, &worker.endpoints) {
            Incoming::Control(Ok(request)) => {
                if worker.handle_control(request) {
                    break;
                }
            },
            // Engine handle dropped without an explicit shutdown.
            Incoming::Control(Err(_)) => break,
            Incoming::Session(index, Ok(request)) => worker.handle_session(index, request),
            Incoming::Session(index, Err(_)) => worker.retire_disconnected(index),
        }
    }

    // Dropping the worker releases every remaining backend handle.
    debug!(resident = worker.pool.len(), "codec worker exiting");
}

enum Incoming {
    Control(Result<ControlRequest, RecvError>),
    Session(usize, Result<SessionRequest, RecvError>),
}

/// Block until any endpoint has a message. The select set is rebuilt per
/// message; the endpoint count is bounded by pool capacity, so the rebuild
/// cost does not matter.
fn next_message(ctrl_rx: &Receiver<ControlRequest>, endpoints: &[WorkerEndpoint]) -> Incoming {
    let mut select = Select::new();
    select.recv(ctrl_rx);
    for endpoint in endpoints {
        select.recv(&endpoint.request_rx);
    }
    let oper = select.select();
    match oper.index() {
        0 => Incoming::Control(oper.recv(ctrl_rx)),
        index => Incoming::Session(index - 1, oper.recv(&endpoints[index - 1].request_rx)),
    }
}
