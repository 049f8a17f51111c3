//! Session proxies: validated requests in, correlated replies out.
//!
//! Every operation takes `&mut self` and awaits its reply before returning,
//! so one session can never have two operations in flight; the single
//! endpoint plus FIFO handling inside the worker then makes the next reply
//! on the endpoint *the* reply to the request just sent.

use voicewire_core::options::check_bitrate;
use voicewire_core::{DecoderOptions, EncoderOptions, ValidationError};

use crate::endpoint::{EndpointId, ProxyEndpoint};
use crate::error::EngineError;
use crate::protocol::{SessionReply, SessionRequest};

/// Client-side handle of a pooled encoder session.
pub struct Encoder {
    endpoint: ProxyEndpoint,
    options: EncoderOptions,
    frame_size: usize,
    destroyed: bool,
}

impl Encoder {
    pub(crate) async fn establish(
        mut endpoint: ProxyEndpoint,
        options: EncoderOptions,
    ) -> Result<Self, EngineError> {
        match endpoint.reply_rx.recv().await {
            Some(SessionReply::Created(Ok(descriptor))) => Ok(Self {
                endpoint,
                options,
                frame_size: descriptor.frame_size,
                destroyed: false,
            }),
            Some(SessionReply::Created(Err(error))) => Err(error.into()),
            Some(_) | None => Err(EngineError::WorkerExited),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.endpoint.id
    }

    pub fn sample_rate(&self) -> u32 {
        self.options.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.options.channels
    }

    pub fn bitrate(&self) -> u32 {
        self.options.bitrate
    }

    pub fn enable_dtx(&self) -> bool {
        self.options.enable_dtx
    }

    /// Samples expected per [`Self::encode`] call.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Encode one 20 ms frame. The buffer is consumed on send and owned by
    /// the worker afterwards. `Ok(None)` is the DTX silent-frame outcome.
    pub async fn encode(&mut self, frame: Vec<i16>) -> Result<Option<Vec<u8>>, EngineError> {
        self.ensure_live()?;
        if frame.len() != self.frame_size {
            return Err(ValidationError::FrameSize {
                expected: self.frame_size,
                got: frame.len(),
            }
            .into());
        }
        self.send(SessionRequest::Encode { frame })?;
        match self.endpoint.reply_rx.recv().await {
            Some(SessionReply::Encoded(result)) => result.map_err(EngineError::from),
            Some(_) | None => Err(EngineError::Evicted),
        }
    }

    /// Switch the encode bitrate on the live session.
    pub async fn set_bitrate(&mut self, bitrate: u32) -> Result<(), EngineError> {
        self.ensure_live()?;
        check_bitrate(bitrate)?;
        self.send(SessionRequest::SetBitrate { bitrate })?;
        match self.endpoint.reply_rx.recv().await {
            Some(SessionReply::BitrateChanged(Ok(()))) => {
                self.options.bitrate = bitrate;
                Ok(())
            },
            Some(SessionReply::BitrateChanged(Err(error))) => Err(error.into()),
            Some(_) | None => Err(EngineError::Evicted),
        }
    }

    /// Release the pooled session. Fire-and-forget: the worker sends no
    /// acknowledgement, and every later call on this proxy fails with
    /// [`EngineError::UseAfterDestroy`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let _ = self.endpoint.request_tx.send(SessionRequest::Destroy);
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.destroyed {
            Err(EngineError::UseAfterDestroy)
        } else {
            Ok(())
        }
    }

    fn send(&self, request: SessionRequest) -> Result<(), EngineError> {
        // A closed endpoint means the worker retired this session, which
        // for a live proxy is eviction.
        self.endpoint
            .request_tx
            .send(request)
            .map_err(|_| EngineError::Evicted)
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Client-side handle of a pooled decoder session.
pub struct Decoder {
    endpoint: ProxyEndpoint,
    options: DecoderOptions,
    frame_size: usize,
    destroyed: bool,
}

impl Decoder {
    pub(crate) async fn establish(
        mut endpoint: ProxyEndpoint,
        options: DecoderOptions,
    ) -> Result<Self, EngineError> {
        match endpoint.reply_rx.recv().await {
            Some(SessionReply::Created(Ok(descriptor))) => Ok(Self {
                endpoint,
                options,
                frame_size: descriptor.frame_size,
                destroyed: false,
            }),
            Some(SessionReply::Created(Err(error))) => Err(error.into()),
            Some(_) | None => Err(EngineError::WorkerExited),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.endpoint.id
    }

    pub fn sample_rate(&self) -> u32 {
        self.options.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.options.channels
    }

    /// Samples produced per decoded frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Decode one packet. The buffer is consumed on send; `None` marks a
    /// lost packet and yields comfort noise.
    pub async fn decode(&mut self, packet: Option<Vec<u8>>) -> Result<Vec<i16>, EngineError> {
        self.ensure_live()?;
        self.send(SessionRequest::Decode { packet })?;
        match self.endpoint.reply_rx.recv().await {
            Some(SessionReply::Decoded(result)) => result.map_err(EngineError::from),
            Some(_) | None => Err(EngineError::Evicted),
        }
    }

    /// Release the pooled session; see [`Encoder::destroy`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let _ = self.endpoint.request_tx.send(SessionRequest::Destroy);
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        if self.destroyed {
            Err(EngineError::UseAfterDestroy)
        } else {
            Ok(())
        }
    }

    fn send(&self, request: SessionRequest) -> Result<(), EngineError> {
        self.endpoint
            .request_tx
            .send(request)
            .map_err(|_| EngineError::Evicted)
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        self.destroy();
    }
}
