//! Client-facing engine surface for the offloaded mode.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use tokio::sync::{broadcast, oneshot};

use voicewire_codec::ModuleLoader;
use voicewire_core::{DecoderOptions, EncoderOptions, ModuleLocator};

use crate::config::EngineConfig;
use crate::endpoint;
use crate::error::EngineError;
use crate::events::{EngineEvent, EventHub};
use crate::protocol::ControlRequest;
use crate::session::{Decoder, Encoder};
use crate::worker;

/// Spawn the codec worker thread. The returned handle is the only way to
/// reach it; dropping the handle without [`EngineHandle::shutdown`] stops
/// the worker and releases every pooled session.
pub fn start_engine(
    loader: Arc<dyn ModuleLoader>,
    config: EngineConfig,
) -> Result<EngineHandle, EngineError> {
    let events = Arc::new(EventHub::new(config.event_capacity));
    let (ctrl_tx, join) = worker::spawn(loader, config, Arc::clone(&events))
        .map_err(|source| EngineError::Spawn { source })?;
    Ok(EngineHandle {
        ctrl_tx,
        join,
        events,
    })
}

pub struct EngineHandle {
    ctrl_tx: Sender<ControlRequest>,
    join: JoinHandle<()>,
    events: Arc<EventHub>,
}

impl EngineHandle {
    /// Load the codec backend inside the worker. Sessions can only be
    /// created once this has completed; loading twice fails with
    /// [`voicewire_core::LoadError::AlreadyLoaded`].
    pub async fn load(&self, locator: ModuleLocator) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.ctrl_tx
            .send(ControlRequest::Load { locator, reply_tx })
            .map_err(|_| EngineError::WorkerExited)?;
        match reply_rx.await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => Err(EngineError::WorkerExited),
        }
    }

    /// Create an encoder session. Options are validated here, before
    /// anything is sent; the create request then rides the session's own
    /// endpoint, and its reply resolves this future.
    pub async fn create_encoder(&self, options: EncoderOptions) -> Result<Encoder, EngineError> {
        options.validate()?;
        let (proxy, worker_end) = endpoint::session_endpoint();
        self.ctrl_tx
            .send(ControlRequest::CreateEncoder {
                options,
                endpoint: worker_end,
            })
            .map_err(|_| EngineError::WorkerExited)?;
        Encoder::establish(proxy, options).await
    }

    /// Create a decoder session; symmetric to [`Self::create_encoder`].
    pub async fn create_decoder(&self, options: DecoderOptions) -> Result<Decoder, EngineError> {
        options.validate()?;
        let (proxy, worker_end) = endpoint::session_endpoint();
        self.ctrl_tx
            .send(ControlRequest::CreateDecoder {
                options,
                endpoint: worker_end,
            })
            .map_err(|_| EngineError::WorkerExited)?;
        Decoder::establish(proxy, options).await
    }

    /// Lifecycle events from the worker: loads, session creation, eviction
    /// and destruction.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Release every pooled session and stop the worker thread.
    pub async fn shutdown(self) -> Result<(), EngineError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.ctrl_tx
            .send(ControlRequest::Shutdown { ack_tx })
            .map_err(|_| EngineError::WorkerExited)?;
        ack_rx.await.map_err(|_| EngineError::WorkerExited)?;
        // The worker breaks out of its loop right after the ack, so the
        // join is immediate.
        self.join.join().map_err(|_| EngineError::WorkerPanicked)?;
        Ok(())
    }
}
