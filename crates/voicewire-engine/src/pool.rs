//! Bounded session pool with least-recently-touched eviction.
//!
//! The pool is only ever mutated synchronously from inside the worker's
//! message handlers, which run one at a time to completion. That is what
//! makes eviction safe without locks: a session can never be evicted out
//! from under an operation that is currently using it.

use std::collections::HashMap;

use tracing::debug;

use voicewire_codec::{CodecDecoder, CodecEncoder, CodecModule};
use voicewire_core::{CreationError, DecoderOptions, EncoderOptions, SessionKind};

use crate::endpoint::EndpointId;

pub(crate) struct SessionPool {
    capacity: usize,
    /// Monotonic touch clock. Every access gets a fresh tick, so stamps are
    /// unique and the oldest-stamp scan is total and deterministic.
    clock: u64,
    sessions: HashMap<EndpointId, PooledSession>,
}

pub(crate) struct PooledSession {
    pub(crate) codec: SessionCodec,
    pub(crate) frame_size: usize,
    touched: u64,
}

pub(crate) enum SessionCodec {
    Encoder(Box<dyn CodecEncoder>),
    Decoder(Box<dyn CodecDecoder>),
}

impl SessionCodec {
    pub(crate) fn kind(&self) -> SessionKind {
        match self {
            Self::Encoder(_) => SessionKind::Encoder,
            Self::Decoder(_) => SessionKind::Decoder,
        }
    }
}

/// Result of a successful acquire.
pub(crate) struct Acquired {
    pub(crate) frame_size: usize,
    /// Session dropped to make room, already released. The dispatcher must
    /// retire its endpoint so the stale proxy observes a closed channel.
    pub(crate) evicted: Option<Evicted>,
}

pub(crate) struct Evicted {
    pub(crate) id: EndpointId,
    pub(crate) kind: SessionKind,
}

impl SessionPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            clock: 0,
            sessions: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: EndpointId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Create (or idempotently hand back) the encoder bound to `id`.
    ///
    /// At capacity the least recently touched session of either kind is
    /// released and unmapped before the backend is asked for a new one; a
    /// creation failure therefore leaves no partial mapping behind.
    pub(crate) fn acquire_encoder(
        &mut self,
        id: EndpointId,
        module: &dyn CodecModule,
        options: &EncoderOptions,
    ) -> Result<Acquired, CreationError> {
        let stamp = self.next_stamp();
        if let Some(session) = self.sessions.get_mut(&id) {
            // An endpoint stays bound to the same session for its whole
            // lifetime, so a live mapping is simply handed back.
            session.touched = stamp;
            return Ok(Acquired {
                frame_size: session.frame_size,
                evicted: None,
            });
        }

        let evicted = self.evict_if_full();
        let handle = module.create_encoder(options)?;
        let frame_size = options.frame_size();
        self.sessions.insert(
            id,
            PooledSession {
                codec: SessionCodec::Encoder(handle),
                frame_size,
                touched: stamp,
            },
        );
        Ok(Acquired {
            frame_size,
            evicted,
        })
    }

    pub(crate) fn acquire_decoder(
        &mut self,
        id: EndpointId,
        module: &dyn CodecModule,
        options: &DecoderOptions,
    ) -> Result<Acquired, CreationError> {
        let stamp = self.next_stamp();
        if let Some(session) = self.sessions.get_mut(&id) {
            session.touched = stamp;
            return Ok(Acquired {
                frame_size: session.frame_size,
                evicted: None,
            });
        }

        let evicted = self.evict_if_full();
        let handle = module.create_decoder(options)?;
        let frame_size = options.frame_size();
        self.sessions.insert(
            id,
            PooledSession {
                codec: SessionCodec::Decoder(handle),
                frame_size,
                touched: stamp,
            },
        );
        Ok(Acquired {
            frame_size,
            evicted,
        })
    }

    /// Refresh the recency stamp and hand out the session. Called for every
    /// encode/decode access, not only at creation.
    pub(crate) fn touch(&mut self, id: EndpointId) -> Option<&mut PooledSession> {
        let stamp = self.next_stamp();
        let session = self.sessions.get_mut(&id)?;
        session.touched = stamp;
        Some(session)
    }

    /// Unconditional removal, independent of recency. Dropping the session
    /// releases the backend handle.
    pub(crate) fn release(&mut self, id: EndpointId) -> Option<SessionKind> {
        self.sessions.remove(&id).map(|session| session.codec.kind())
    }

    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_if_full(&mut self) -> Option<Evicted> {
        if self.sessions.len() < self.capacity {
            return None;
        }
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, session)| session.touched)
            .map(|(id, _)| *id)?;
        let kind = self.release(oldest)?;
        debug!(id = %oldest, %kind, "evicted least recently used session");
        Some(Evicted { id: oldest, kind })
    }
}
