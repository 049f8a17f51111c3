//! Shared fake codec backend for engine and pool tests.
//!
//! The fake encoder is lossless (i16 samples to little-endian bytes) so a
//! round trip through the protocol proves payloads cross the worker
//! boundary bit-identical. Drop impls count releases, which is how tests
//! observe that eviction and destruction release backend handles exactly
//! once.

use std::sync::{Arc, Once};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use voicewire_codec::{CodecDecoder, CodecEncoder, CodecModule, ModuleLoader};
use voicewire_core::{
    CreationError, DecodeError, DecoderOptions, EncodeError, EncoderOptions, LoadError,
    ModuleLocator, SessionKind,
};

use crate::config::EngineConfig;
use crate::handle::{EngineHandle, start_engine};

#[derive(Default)]
pub(crate) struct BackendStats {
    pub(crate) loads: AtomicUsize,
    pub(crate) encoders_created: AtomicUsize,
    pub(crate) decoders_created: AtomicUsize,
    pub(crate) released: AtomicUsize,
    pub(crate) encode_calls: AtomicUsize,
    pub(crate) decode_calls: AtomicUsize,
    pub(crate) fail_creates: AtomicBool,
    pub(crate) reject_bitrate: AtomicBool,
}

pub(crate) struct TestLoader {
    stats: Arc<BackendStats>,
    fail: bool,
}

impl TestLoader {
    pub(crate) fn new(stats: Arc<BackendStats>) -> Self {
        Self { stats, fail: false }
    }

    pub(crate) fn failing(stats: Arc<BackendStats>) -> Self {
        Self { stats, fail: true }
    }
}

impl ModuleLoader for TestLoader {
    fn load(&self, _locator: &ModuleLocator) -> Result<Box<dyn CodecModule>, LoadError> {
        self.stats.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LoadError::Backend {
                message: "model files missing".to_string(),
            });
        }
        Ok(Box::new(TestModule::new(Arc::clone(&self.stats))))
    }
}

pub(crate) struct TestModule {
    stats: Arc<BackendStats>,
}

impl TestModule {
    pub(crate) fn new(stats: Arc<BackendStats>) -> Self {
        Self { stats }
    }
}

impl CodecModule for TestModule {
    fn create_encoder(
        &self,
        options: &EncoderOptions,
    ) -> Result<Box<dyn CodecEncoder>, CreationError> {
        if self.stats.fail_creates.load(Ordering::SeqCst) {
            return Err(CreationError::Backend {
                kind: SessionKind::Encoder,
                message: "model rejected configuration".to_string(),
            });
        }
        self.stats.encoders_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestEncoder {
            stats: Arc::clone(&self.stats),
            enable_dtx: options.enable_dtx,
        }))
    }

    fn create_decoder(
        &self,
        options: &DecoderOptions,
    ) -> Result<Box<dyn CodecDecoder>, CreationError> {
        if self.stats.fail_creates.load(Ordering::SeqCst) {
            return Err(CreationError::Backend {
                kind: SessionKind::Decoder,
                message: "model rejected configuration".to_string(),
            });
        }
        self.stats.decoders_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestDecoder {
            stats: Arc::clone(&self.stats),
            frame_size: options.frame_size(),
        }))
    }
}

pub(crate) struct TestEncoder {
    stats: Arc<BackendStats>,
    enable_dtx: bool,
}

impl CodecEncoder for TestEncoder {
    fn encode(&mut self, frame: &[i16]) -> Result<Option<Vec<u8>>, EncodeError> {
        self.stats.encode_calls.fetch_add(1, Ordering::SeqCst);
        if self.enable_dtx && frame.iter().all(|sample| *sample == 0) {
            return Ok(None);
        }
        Ok(Some(
            frame.iter().flat_map(|sample| sample.to_le_bytes()).collect(),
        ))
    }

    fn set_bitrate(&mut self, _bitrate: u32) -> bool {
        !self.stats.reject_bitrate.load(Ordering::SeqCst)
    }
}

impl Drop for TestEncoder {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct TestDecoder {
    stats: Arc<BackendStats>,
    frame_size: usize,
}

impl CodecDecoder for TestDecoder {
    fn decode(&mut self, packet: Option<&[u8]>) -> Result<Vec<i16>, DecodeError> {
        self.stats.decode_calls.fetch_add(1, Ordering::SeqCst);
        match packet {
            Some(bytes) => Ok(bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect()),
            None => Ok(vec![0; self.frame_size]),
        }
    }
}

impl Drop for TestDecoder {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route worker logs through the test writer; filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn locator() -> ModuleLocator {
    ModuleLocator::new("codec/", "models/")
}

/// Engine with a loaded fake backend and the given pool capacity.
pub(crate) async fn started_engine(pool_capacity: usize) -> (EngineHandle, Arc<BackendStats>) {
    init_tracing();
    let stats = Arc::new(BackendStats::default());
    let loader = Arc::new(TestLoader::new(Arc::clone(&stats)));
    let engine = start_engine(
        loader,
        EngineConfig {
            pool_capacity,
            ..EngineConfig::default()
        },
    )
    .expect("start engine");
    engine.load(locator()).await.expect("load module");
    (engine, stats)
}

/// A frame with at least one audible sample, so DTX never swallows it.
pub(crate) fn audible_frame(frame_size: usize) -> Vec<i16> {
    (0..frame_size).map(|i| ((i % 200) as i16) - 100).collect()
}
