//! Per-session message endpoints.
//!
//! An endpoint pair is created for every session before the create request
//! is sent: the proxy keeps one half, the worker receives the other inside
//! the create message. The endpoint id is the sole key the pool knows a
//! session by, and the reply sender is the sole destination for that
//! session's replies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::protocol::{SessionReply, SessionRequest};

/// Opaque, process-unique identity of one session endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId(u64);

impl EndpointId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct ProxyEndpoint {
    pub(crate) id: EndpointId,
    pub(crate) request_tx: Sender<SessionRequest>,
    pub(crate) reply_rx: UnboundedReceiver<SessionReply>,
}

pub(crate) struct WorkerEndpoint {
    pub(crate) id: EndpointId,
    pub(crate) request_rx: Receiver<SessionRequest>,
    pub(crate) reply_tx: UnboundedSender<SessionReply>,
}

/// Create a connected endpoint pair with a fresh id.
pub(crate) fn session_endpoint() -> (ProxyEndpoint, WorkerEndpoint) {
    let id = EndpointId::next();
    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (reply_tx, reply_rx) = tokio::sync::mpsc::unbounded_channel();
    (
        ProxyEndpoint {
            id,
            request_tx,
            reply_rx,
        },
        WorkerEndpoint {
            id,
            request_rx,
            reply_tx,
        },
    )
}
