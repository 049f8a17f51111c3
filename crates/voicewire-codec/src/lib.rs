//! Capability contract of the codec backend plus the in-process mode, where
//! codec calls run synchronously on the caller's own thread.
//!
//! The backend itself (the signal-processing implementation) is opaque to
//! this crate; it is supplied as an implementation of the traits in
//! [`backend`] and injected explicitly wherever it is needed.

#![deny(clippy::wildcard_imports)]

pub mod backend;
mod module;

pub use backend::{CodecDecoder, CodecEncoder, CodecModule, ModuleLoader};
pub use module::{Decoder, Encoder, Module};
