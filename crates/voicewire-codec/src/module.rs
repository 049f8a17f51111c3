//! In-process mode: validated wrappers that call the backend synchronously
//! on the caller's thread. The call blocks for the duration of the native
//! operation; there is no concurrency to manage.

use voicewire_core::options::check_bitrate;
use voicewire_core::{
    CreationError, DecodeError, DecoderOptions, EncodeError, EncoderOptions, LoadError,
    ModuleLocator, ValidationError,
};

use crate::backend::{CodecDecoder, CodecEncoder, CodecModule, ModuleLoader};

/// A loaded codec module. Sessions created from it run on the caller's
/// thread.
pub struct Module {
    backend: Box<dyn CodecModule>,
}

impl Module {
    pub fn load(loader: &dyn ModuleLoader, locator: &ModuleLocator) -> Result<Self, LoadError> {
        let backend = loader.load(locator)?;
        Ok(Self { backend })
    }

    /// Create an encoder session. Options are validated against the fixed
    /// domains before the backend is asked for anything.
    pub fn create_encoder(&self, options: EncoderOptions) -> Result<Encoder, CreationError> {
        options.validate()?;
        let handle = self.backend.create_encoder(&options)?;
        Ok(Encoder {
            handle,
            frame_size: options.frame_size(),
            options,
        })
    }

    pub fn create_decoder(&self, options: DecoderOptions) -> Result<Decoder, CreationError> {
        options.validate()?;
        let handle = self.backend.create_decoder(&options)?;
        Ok(Decoder {
            handle,
            frame_size: options.frame_size(),
            options,
        })
    }
}

/// An in-process encoder session. Dropping it releases the backend handle.
pub struct Encoder {
    handle: Box<dyn CodecEncoder>,
    options: EncoderOptions,
    frame_size: usize,
}

impl Encoder {
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

    /// Encode one 20 ms frame. `Ok(None)` means DTX produced no bytes for a
    /// silent frame; that is a success outcome, not an error.
    pub fn encode(&mut self, frame: &[i16]) -> Result<Option<Vec<u8>>, EncodeError> {
        if frame.len() != self.frame_size {
            return Err(ValidationError::FrameSize {
                expected: self.frame_size,
                got: frame.len(),
            }
            .into());
        }
        self.handle.encode(frame)
    }

    /// Switch the encode bitrate on the live session.
    pub fn set_bitrate(&mut self, bitrate: u32) -> Result<(), EncodeError> {
        check_bitrate(bitrate)?;
        if !self.handle.set_bitrate(bitrate) {
            return Err(EncodeError::BitrateRejected { bitrate });
        }
        self.options.bitrate = bitrate;
        Ok(())
    }
}

/// An in-process decoder session. Dropping it releases the backend handle.
pub struct Decoder {
    handle: Box<dyn CodecDecoder>,
    options: DecoderOptions,
    frame_size: usize,
}

impl Decoder {
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

    /// Decode one packet. `None` marks a lost packet and yields comfort
    /// noise instead of failing.
    pub fn decode(&mut self, packet: Option<&[u8]>) -> Result<Vec<i16>, DecodeError> {
        self.handle.decode(packet)
    }
}
