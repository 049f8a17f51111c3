//! Top-level error type for the offloaded engine surface.

use thiserror::Error;

use voicewire_core::{CreationError, DecodeError, EncodeError, LoadError, ValidationError};

#[derive(Debug, Error)]
pub enum EngineError {
    /// Worker thread could not be spawned.
    #[error("failed to spawn codec worker: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Creation(#[from] CreationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Operation on a session whose `destroy` already ran. Raised on the
    /// caller's side; nothing is sent to the worker.
    #[error("session was already destroyed")]
    UseAfterDestroy,
    /// The session was evicted from the pool to make room for a newer one.
    /// The proxy is stale; whether to create a replacement is the caller's
    /// call.
    #[error("session was evicted from the codec worker pool")]
    Evicted,
    /// The worker exited before the operation completed.
    #[error("codec worker exited")]
    WorkerExited,
    #[error("codec worker thread panicked")]
    WorkerPanicked,
}
