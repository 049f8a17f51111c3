//! Eviction behavior observed through the public surface: capacity bound,
//! oldest-touch victim selection, and the fail-hard contract for stale
//! proxies.

use std::sync::atomic::Ordering;

use voicewire_core::{DecoderOptions, EncoderOptions};

use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::tests::harness::{audible_frame, started_engine};

#[tokio::test]
async fn pool_never_exceeds_capacity_and_only_the_tail_survives() {
    let (engine, stats) = started_engine(4).await;
    let mut events = engine.subscribe();

    let mut encoders = Vec::new();
    for _ in 0..10 {
        encoders.push(
            engine
                .create_encoder(EncoderOptions::default())
                .await
                .expect("create encoder"),
        );
    }

    let mut created = 0;
    let mut evicted = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::SessionCreated { .. } => created += 1,
            EngineEvent::SessionEvicted { .. } => evicted += 1,
            _ => {},
        }
    }
    assert_eq!(created, 10);
    assert_eq!(evicted, 6);
    assert_eq!(stats.released.load(Ordering::SeqCst), 6);

    // The first six proxies are stale, the last four still live.
    for encoder in &mut encoders[..6] {
        let error = encoder
            .encode(audible_frame(320))
            .await
            .err()
            .expect("stale proxy must fail");
        assert!(matches!(error, EngineError::Evicted));
    }
    for encoder in &mut encoders[6..] {
        encoder
            .encode(audible_frame(320))
            .await
            .expect("resident session must work");
    }
}

#[tokio::test]
async fn the_least_recently_touched_session_is_the_victim() {
    let (engine, _stats) = started_engine(3).await;
    let mut events = engine.subscribe();

    let mut first = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder");
    let mut second = engine
        .create_decoder(DecoderOptions::default())
        .await
        .expect("create decoder");
    let mut third = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder");

    // Touch the oldest session; the decoder becomes the eviction victim.
    first.encode(audible_frame(320)).await.expect("touch first");

    let mut fourth = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder");

    let victim = loop {
        match events.recv().await.expect("event stream open") {
            EngineEvent::SessionEvicted { id, .. } => break id,
            _ => {},
        }
    };
    assert_eq!(victim, second.id());

    let error = second.decode(None).await.err().expect("stale proxy");
    assert!(matches!(error, EngineError::Evicted));
    first.encode(audible_frame(320)).await.expect("first lives");
    third.encode(audible_frame(320)).await.expect("third lives");
    fourth.encode(audible_frame(320)).await.expect("fourth lives");
}

#[tokio::test]
async fn eviction_releases_the_backend_handle_exactly_once() {
    let (engine, stats) = started_engine(1).await;

    let mut first = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder");
    let mut second = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder, evicting the first");

    assert_eq!(stats.released.load(Ordering::SeqCst), 1);

    // A late destroy on the stale proxy goes nowhere; its endpoint is
    // already retired. The survivor keeps working and nothing is released
    // a second time.
    first.destroy();
    second.encode(audible_frame(320)).await.expect("survivor");
    assert_eq!(stats.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_stale_proxy_can_be_replaced_explicitly() {
    let (engine, _stats) = started_engine(1).await;

    let mut first = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder");
    let mut second = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("create encoder, evicting the first");

    let error = first
        .encode(audible_frame(320))
        .await
        .err()
        .expect("evicted session fails hard");
    assert!(matches!(error, EngineError::Evicted));

    // Recreating is the caller's decision; the replacement works even
    // though it in turn evicts the second session.
    let mut replacement = engine
        .create_encoder(EncoderOptions::default())
        .await
        .expect("recreate after eviction");
    replacement
        .encode(audible_frame(320))
        .await
        .expect("replacement session works");

    let error = second.encode(audible_frame(320)).await.err().expect("now stale");
    assert!(matches!(error, EngineError::Evicted));
}
