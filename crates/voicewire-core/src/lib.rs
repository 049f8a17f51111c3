//! Shared types for the voicewire codec wrapper: session options with their
//! fixed configuration domains, frame-size math, the module locator and the
//! error taxonomy used by both the in-process and the offloaded mode.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod options;

pub use error::{CreationError, DecodeError, EncodeError, LoadError, ValidationError};
pub use options::{
    DEFAULT_BITRATE, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, DecoderOptions, EncoderOptions,
    FRAME_DURATION_MS, SUPPORTED_BITRATES, SUPPORTED_SAMPLE_RATES, frame_size,
};

/// Version of the codec bitstream this wrapper tracks. Bumped whenever the
/// backend changes its encoding in an incompatible way.
pub const FORMAT_VERSION: &str = "1.3.0";

/// Where to find the codec backend and its model files. Both fields accept a
/// filesystem path or a URL; interpretation is up to the injected loader
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLocator {
    /// Directory holding the codec binary/runtime files.
    pub module_path: String,
    /// Directory holding the model files the codec loads at startup.
    pub model_path: String,
}

impl ModuleLocator {
    pub fn new(module_path: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            model_path: model_path.into(),
        }
    }
}

/// Which half of the codec a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Encoder,
    Decoder,
}

impl SessionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Encoder => "encoder",
            Self::Decoder => "decoder",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
