//! Session options and the fixed configuration domains they are validated
//! against. Validation runs before a request ever leaves the caller, so an
//! invalid configuration never crosses into the codec worker.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sample rates the codec accepts, in Hz.
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [8000, 16000, 32000, 48000];

/// Encode bitrates the codec accepts, in bits per second.
pub const SUPPORTED_BITRATES: [u32; 3] = [3200, 6000, 9200];

/// One frame always spans 20 ms of audio, independent of sample rate.
pub const FRAME_DURATION_MS: u32 = 20;

pub const DEFAULT_SAMPLE_RATE: u32 = 16000;
pub const DEFAULT_BITRATE: u32 = 9200;
pub const DEFAULT_CHANNELS: u16 = 1;

/// Samples in one 20 ms frame at `sample_rate`.
pub fn frame_size(sample_rate: u32) -> usize {
    (sample_rate * FRAME_DURATION_MS / 1000) as usize
}

pub fn check_sample_rate(sample_rate: u32) -> Result<(), ValidationError> {
    if SUPPORTED_SAMPLE_RATES.contains(&sample_rate) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedSampleRate { got: sample_rate })
    }
}

pub fn check_channels(channels: u16) -> Result<(), ValidationError> {
    if channels == 1 {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedChannels { got: channels })
    }
}

pub fn check_bitrate(bitrate: u32) -> Result<(), ValidationError> {
    if SUPPORTED_BITRATES.contains(&bitrate) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedBitrate { got: bitrate })
    }
}

/// Configuration for one encoder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Sample rate of the input audio, one of [`SUPPORTED_SAMPLE_RATES`].
    pub sample_rate: u32,
    /// Channel count of the input audio; only mono is supported.
    pub channels: u16,
    /// Bitrate of the encoded stream, one of [`SUPPORTED_BITRATES`]. Can be
    /// changed later on a live session.
    pub bitrate: u32,
    /// Discontinuous transmission: when enabled the encoder may emit no
    /// bytes at all for a silent frame.
    pub enable_dtx: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bitrate: DEFAULT_BITRATE,
            enable_dtx: false,
        }
    }
}

impl EncoderOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_sample_rate(self.sample_rate)?;
        check_channels(self.channels)?;
        check_bitrate(self.bitrate)?;
        Ok(())
    }

    /// Samples the encoder expects per encode call.
    pub fn frame_size(&self) -> usize {
        frame_size(self.sample_rate)
    }
}

/// Configuration for one decoder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Sample rate of the decoded output, one of [`SUPPORTED_SAMPLE_RATES`].
    pub sample_rate: u32,
    /// Channel count of the decoded output; only mono is supported.
    pub channels: u16,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl DecoderOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_sample_rate(self.sample_rate)?;
        check_channels(self.channels)?;
        Ok(())
    }

    /// Samples the decoder produces per frame.
    pub fn frame_size(&self) -> usize {
        frame_size(self.sample_rate)
    }
}
