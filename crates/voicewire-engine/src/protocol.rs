//! Closed message taxonomy between the proxies and the codec worker.
//!
//! Binary payloads (PCM frames, encoded packets) are moved into these
//! messages: the sender's buffer is consumed on send and owned by the
//! receiver afterwards. Replies move their payloads out the same way.
//!
//! Create replies arrive on the session endpoint itself, not on the control
//! channel; once the worker registers the endpoint it serves session
//! operations for the rest of the session's lifetime.

use tokio::sync::oneshot;

use voicewire_core::{
    CreationError, DecodeError, DecoderOptions, EncodeError, EncoderOptions, LoadError,
    ModuleLocator,
};

use crate::endpoint::WorkerEndpoint;

/// Requests on the engine's control channel, one per engine instance.
pub(crate) enum ControlRequest {
    Load {
        locator: ModuleLocator,
        reply_tx: oneshot::Sender<Result<(), LoadError>>,
    },
    CreateEncoder {
        options: EncoderOptions,
        endpoint: WorkerEndpoint,
    },
    CreateDecoder {
        options: DecoderOptions,
        endpoint: WorkerEndpoint,
    },
    Shutdown {
        ack_tx: oneshot::Sender<()>,
    },
}

/// Requests on a session endpoint.
pub(crate) enum SessionRequest {
    Encode {
        /// Exactly one frame of PCM; consumed on send.
        frame: Vec<i16>,
    },
    SetBitrate {
        bitrate: u32,
    },
    Decode {
        /// Encoded packet, consumed on send; `None` marks a lost packet.
        packet: Option<Vec<u8>>,
    },
    /// Fire-and-forget: the worker releases the session and sends no reply.
    Destroy,
}

/// Replies on a session endpoint.
#[derive(Debug)]
pub(crate) enum SessionReply {
    Created(Result<SessionDescriptor, CreationError>),
    Encoded(Result<Option<Vec<u8>>, EncodeError>),
    BitrateChanged(Result<(), EncodeError>),
    Decoded(Result<Vec<i16>, DecodeError>),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionDescriptor {
    pub(crate) frame_size: usize,
}
