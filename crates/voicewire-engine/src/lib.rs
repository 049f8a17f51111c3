//! Offloaded codec sessions.
//!
//! A dedicated worker thread owns the codec backend and a bounded pool of
//! live encoder/decoder sessions, evicting the least recently used session
//! when a new one would exceed capacity. Client-facing proxies talk to the
//! worker exclusively through per-session message endpoints; the endpoint a
//! reply arrives on is the correlation key, so the protocol needs no request
//! ids. The worker processes one message at a time, which serializes every
//! pool mutation with the codec operations themselves.

#![deny(clippy::wildcard_imports)]

mod config;
mod endpoint;
mod error;
mod events;
mod handle;
mod pool;
mod protocol;
mod session;
mod worker;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use endpoint::EndpointId;
pub use error::EngineError;
pub use events::EngineEvent;
pub use handle::{EngineHandle, start_engine};
pub use session::{Decoder, Encoder};
