//! Capability contract the opaque codec backend has to satisfy.
//!
//! Sessions are expensive native resources: creating one allocates model
//! state inside the backend, and dropping the boxed handle is the one and
//! only release of that state. Handles are exclusively owned; they are never
//! shared between sessions.

use voicewire_core::{
    CreationError, DecodeError, DecoderOptions, EncodeError, EncoderOptions, LoadError,
    ModuleLocator,
};

/// Resolves a locator into a loaded codec module.
///
/// Injected explicitly wherever loading happens; never read from process
/// globals. The call may block while it fetches and initializes the backend,
/// so in offloaded mode it runs inside the codec worker.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, locator: &ModuleLocator) -> Result<Box<dyn CodecModule>, LoadError>;
}

/// One loaded codec backend instance, created once per execution context and
/// shared read-only by every session within it.
pub trait CodecModule: Send {
    fn create_encoder(
        &self,
        options: &EncoderOptions,
    ) -> Result<Box<dyn CodecEncoder>, CreationError>;

    fn create_decoder(
        &self,
        options: &DecoderOptions,
    ) -> Result<Box<dyn CodecDecoder>, CreationError>;
}

/// A live encoder session inside the backend.
pub trait CodecEncoder: Send {
    /// Encode exactly one 20 ms frame. `Ok(None)` is the DTX outcome: the
    /// frame was silent and the encoder chose to emit no bytes.
    fn encode(&mut self, frame: &[i16]) -> Result<Option<Vec<u8>>, EncodeError>;

    /// Returns `false` when the backend rejects the new bitrate.
    fn set_bitrate(&mut self, bitrate: u32) -> bool;
}

/// A live decoder session inside the backend.
pub trait CodecDecoder: Send {
    /// Decode one packet into a frame. `None` marks a lost packet; the
    /// backend then synthesizes comfort noise for the frame.
    fn decode(&mut self, packet: Option<&[u8]>) -> Result<Vec<i16>, DecodeError>;
}
