//! Message handlers for the codec worker. Backend failures, including
//! panics, become typed replies on the requesting endpoint; the worker
//! itself never dies mid-protocol.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, warn};

use voicewire_core::{
    CreationError, DecodeError, DecoderOptions, EncodeError, EncoderOptions, LoadError,
    ModuleLocator, SessionKind,
};

use crate::endpoint::WorkerEndpoint;
use crate::events::EngineEvent;
use crate::pool::{Acquired, Evicted, SessionCodec};
use crate::protocol::{ControlRequest, SessionDescriptor, SessionReply, SessionRequest};
use crate::worker::CodecWorker;

impl CodecWorker {
    /// Returns true when the worker should exit.
    pub(super) fn handle_control(&mut self, request: ControlRequest) -> bool {
        match request {
            ControlRequest::Load { locator, reply_tx } => {
                let _ = reply_tx.send(self.load_module(&locator));
                false
            },
            ControlRequest::CreateEncoder { options, endpoint } => {
                let result = self.acquire_encoder(&endpoint, &options);
                self.finish_create(endpoint, SessionKind::Encoder, result);
                false
            },
            ControlRequest::CreateDecoder { options, endpoint } => {
                let result = self.acquire_decoder(&endpoint, &options);
                self.finish_create(endpoint, SessionKind::Decoder, result);
                false
            },
            ControlRequest::Shutdown { ack_tx } => {
                let _ = ack_tx.send(());
                true
            },
        }
    }

    fn load_module(&mut self, locator: &ModuleLocator) -> Result<(), LoadError> {
        if self.module.is_some() {
            return Err(LoadError::AlreadyLoaded);
        }
        let module = self.loader.load(locator)?;
        self.module = Some(module);
        info!(module_path = %locator.module_path, "codec module loaded");
        self.events.emit(EngineEvent::ModuleLoaded);
        Ok(())
    }

    fn acquire_encoder(
        &mut self,
        endpoint: &WorkerEndpoint,
        options: &EncoderOptions,
    ) -> Result<Acquired, CreationError> {
        let Some(module) = self.module.as_deref() else {
            return Err(CreationError::ModuleNotLoaded);
        };
        let pool = &mut self.pool;
        catch_unwind(AssertUnwindSafe(|| {
            pool.acquire_encoder(endpoint.id, module, options)
        }))
        .unwrap_or_else(|_| {
            Err(CreationError::Backend {
                kind: SessionKind::Encoder,
                message: "codec backend panicked".to_string(),
            })
        })
    }

    fn acquire_decoder(
        &mut self,
        endpoint: &WorkerEndpoint,
        options: &DecoderOptions,
    ) -> Result<Acquired, CreationError> {
        let Some(module) = self.module.as_deref() else {
            return Err(CreationError::ModuleNotLoaded);
        };
        let pool = &mut self.pool;
        catch_unwind(AssertUnwindSafe(|| {
            pool.acquire_decoder(endpoint.id, module, options)
        }))
        .unwrap_or_else(|_| {
            Err(CreationError::Backend {
                kind: SessionKind::Decoder,
                message: "codec backend panicked".to_string(),
            })
        })
    }

    fn finish_create(
        &mut self,
        endpoint: WorkerEndpoint,
        kind: SessionKind,
        result: Result<Acquired, CreationError>,
    ) {
        match result {
            Ok(acquired) => {
                if let Some(evicted) = acquired.evicted {
                    self.retire_evicted(evicted);
                }
                let descriptor = SessionDescriptor {
                    frame_size: acquired.frame_size,
                };
                if endpoint
                    .reply_tx
                    .send(SessionReply::Created(Ok(descriptor)))
                    .is_err()
                {
                    // Proxy vanished before the reply; roll the session back.
                    self.pool.release(endpoint.id);
                    return;
                }
                debug!(id = %endpoint.id, %kind, frame_size = descriptor.frame_size, "session created");
                self.events.emit(EngineEvent::SessionCreated {
                    id: endpoint.id,
                    kind,
                });
                self.endpoints.push(endpoint);
            },
            Err(error) => {
                warn!(id = %endpoint.id, %kind, %error, "session creation failed");
                let _ = endpoint.reply_tx.send(SessionReply::Created(Err(error)));
                // The endpoint is dropped here: no mapping, no registration.
            },
        }
    }

    pub(super) fn handle_session(&mut self, index: usize, request: SessionRequest) {
        let id = self.endpoints[index].id;
        if matches!(request, SessionRequest::Destroy) {
            self.destroy_session(index);
            return;
        }

        let Some(session) = self.pool.touch(id) else {
            // Live endpoint without a pool mapping; retire it.
            warn!(%id, "request for a session that is no longer pooled");
            self.endpoints.swap_remove(index);
            return;
        };

        let reply = match (&mut session.codec, request) {
            (SessionCodec::Encoder(encoder), SessionRequest::Encode { frame }) => {
                let result = catch_unwind(AssertUnwindSafe(|| encoder.encode(&frame)))
                    .unwrap_or(Err(EncodeError::BackendPanicked));
                Some(SessionReply::Encoded(result))
            },
            (SessionCodec::Encoder(encoder), SessionRequest::SetBitrate { bitrate }) => {
                let result =
                    match catch_unwind(AssertUnwindSafe(|| encoder.set_bitrate(bitrate))) {
                        Ok(true) => Ok(()),
                        Ok(false) => Err(EncodeError::BitrateRejected { bitrate }),
                        Err(_) => Err(EncodeError::BackendPanicked),
                    };
                Some(SessionReply::BitrateChanged(result))
            },
            (SessionCodec::Decoder(decoder), SessionRequest::Decode { packet }) => {
                let result = catch_unwind(AssertUnwindSafe(|| decoder.decode(packet.as_deref())))
                    .unwrap_or(Err(DecodeError::BackendPanicked));
                Some(SessionReply::Decoded(result))
            },
            // Unreachable through the public proxies, which only issue
            // requests matching their own session kind.
            (codec, _) => {
                warn!(%id, kind = %codec.kind(), "request does not match session kind");
                None
            },
        };

        if let Some(reply) = reply {
            let _ = self.endpoints[index].reply_tx.send(reply);
        }
    }

    /// The proxy went away without an explicit destroy; release its session.
    pub(super) fn retire_disconnected(&mut self, index: usize) {
        let endpoint = self.endpoints.swap_remove(index);
        if let Some(kind) = self.pool.release(endpoint.id) {
            debug!(id = %endpoint.id, %kind, "proxy disconnected, session released");
            self.events.emit(EngineEvent::SessionDestroyed {
                id: endpoint.id,
                kind,
            });
        }
    }

    fn destroy_session(&mut self, index: usize) {
        let endpoint = self.endpoints.swap_remove(index);
        if let Some(kind) = self.pool.release(endpoint.id) {
            debug!(id = %endpoint.id, %kind, "session destroyed");
            self.events.emit(EngineEvent::SessionDestroyed {
                id: endpoint.id,
                kind,
            });
        }
        // Dropping the endpoint closes the reply channel; destroy itself is
        // fire-and-forget and never gets a reply.
    }

    fn retire_evicted(&mut self, evicted: Evicted) {
        // Drop the endpoint so the stale proxy observes a closed channel on
        // its next request instead of silently getting a new session.
        self.endpoints.retain(|endpoint| endpoint.id != evicted.id);
        self.events.emit(EngineEvent::SessionEvicted {
            id: evicted.id,
            kind: evicted.kind,
        });
    }
}
