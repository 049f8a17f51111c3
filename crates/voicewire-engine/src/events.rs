//! Lifecycle events emitted by the codec worker.

use serde::Serialize;
use tokio::sync::broadcast;

use voicewire_core::SessionKind;

use crate::endpoint::EndpointId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    ModuleLoaded,
    SessionCreated { id: EndpointId, kind: SessionKind },
    /// The session lost its pool slot to a newer one; its proxy is stale.
    SessionEvicted { id: EndpointId, kind: SessionKind },
    SessionDestroyed { id: EndpointId, kind: SessionKind },
}

pub(crate) struct EventHub {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventHub {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}
