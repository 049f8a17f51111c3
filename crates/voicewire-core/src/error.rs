//! Typed failure taxonomy shared by the in-process and offloaded modes.
//!
//! [`ValidationError`] is raised on the caller's side before any request is
//! sent. The remaining errors originate in the codec backend and are carried
//! back to the caller as typed results, never as unhandled faults.

use thiserror::Error;

use crate::SessionKind;

/// Rejected configuration or payload; raised before the backend is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported sample rate: expected one of 8000, 16000, 32000 or 48000, got {got}")]
    UnsupportedSampleRate { got: u32 },
    #[error("unsupported number of channels: expected 1, got {got}")]
    UnsupportedChannels { got: u16 },
    #[error("unsupported bitrate: expected one of 3200, 6000 or 9200, got {got}")]
    UnsupportedBitrate { got: u32 },
    /// Audio payload length does not match the session's frame size.
    #[error("expected a frame of {expected} samples, got {got}")]
    FrameSize { expected: usize, got: usize },
}

/// Failure to load the codec backend; fatal to the module instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("codec backend failed to load: {message}")]
    Backend { message: String },
    /// A module can be loaded once per execution context.
    #[error("codec module is already loaded")]
    AlreadyLoaded,
}

/// Failure to create a session; no session is registered when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A session was requested before the module finished loading.
    #[error("codec module is not loaded")]
    ModuleNotLoaded,
    #[error("codec backend refused to create {kind} session: {message}")]
    Backend { kind: SessionKind, message: String },
}

/// Per-call encoder failure; the session stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backend refused to switch to an otherwise supported bitrate.
    #[error("codec backend rejected bitrate change to {bitrate}")]
    BitrateRejected { bitrate: u32 },
    #[error("encode failed: {message}")]
    Backend { message: String },
    #[error("encoder backend panicked")]
    BackendPanicked,
}

/// Per-call decoder failure; the session stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("decode failed: {message}")]
    Backend { message: String },
    #[error("decoder backend panicked")]
    BackendPanicked,
}
