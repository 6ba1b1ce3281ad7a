//! Gateway behavior under rate limits, caching and concurrent initialization.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::fixtures::{DIM, MockStack, fast_config, strings};
use futures::future::join_all;
use relevance::embedding::MockEmbedder;
use relevance::{GatewayConfig, GatewayError, GatewayState, RateLimiter};

#[test]
fn test_limiter_denies_call_after_max_then_resets() {
    let limiter = RateLimiter::new(5, Duration::from_secs(60));
    let start = Instant::now();

    for i in 0..5 {
        assert!(limiter.is_allowed_at("caller", start + Duration::from_secs(i)));
    }
    assert!(!limiter.is_allowed_at("caller", start + Duration::from_secs(10)));

    // The first admission ages out exactly one window later.
    assert!(limiter.is_allowed_at("caller", start + Duration::from_secs(60)));
    assert!(!limiter.is_allowed_at("caller", start + Duration::from_secs(60)));
}

#[tokio::test]
async fn test_cache_round_trip_skips_embedder() {
    let stack = MockStack::with_defaults();
    let batch = strings(&["first sentence", "second sentence"]);

    let first = stack.gateway.encode(&batch, "caller").await.expect("first");
    let second = stack.gateway.encode(&batch, "caller").await.expect("second");

    assert_eq!(stack.mock().calls(), 1);
    assert_eq!(first.as_ref(), second.as_ref());
}

#[tokio::test]
async fn test_cache_eviction_scenario() {
    let stack = MockStack::new(MockEmbedder::new(DIM), fast_config().with_cache_capacity(10));
    let batches: Vec<Vec<String>> = (0..11).map(|i| vec![format!("batch {i}")]).collect();

    for batch in &batches {
        stack.gateway.encode(batch, "caller").await.expect("encode");
    }
    assert_eq!(stack.mock().calls(), 11);
    assert_eq!(stack.gateway.cache().len(), 10);

    // The eleventh insert evicted the oldest entry.
    stack
        .gateway
        .encode(&batches[0], "caller")
        .await
        .expect("re-encode oldest");
    assert_eq!(stack.mock().calls(), 12);

    stack
        .gateway
        .encode(&batches[10], "caller")
        .await
        .expect("re-encode newest");
    assert_eq!(stack.mock().calls(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_calls_load_once() {
    let stack = MockStack::with_defaults();
    stack
        .factory
        .set_load_delay(Some(Duration::from_millis(100)));

    let gateway = Arc::clone(&stack.gateway);
    let calls = (0..32).map(|i| {
        let gateway = Arc::clone(&gateway);
        async move {
            gateway
                .encode(&[format!("text {i}")], &format!("caller-{}", i % 4))
                .await
        }
    });

    let results = join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(stack.factory.loads(), 1);
    assert_eq!(stack.gateway.state(), GatewayState::Ready);
}

#[tokio::test]
async fn test_init_retry_exhaustion_then_lazy_retry() {
    let stack = MockStack::new(
        MockEmbedder::new(DIM),
        GatewayConfig::default().with_init_retries(3, Duration::from_millis(1)),
    );
    stack.factory.fail_next(3);

    let err = stack
        .gateway
        .encode(&strings(&["text"]), "caller")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::InitializationFailed { attempts: 3, .. }
    ));
    assert_eq!(stack.gateway.state(), GatewayState::Failed);

    stack
        .gateway
        .encode(&strings(&["text"]), "caller")
        .await
        .expect("lazy re-initialization");
    assert_eq!(stack.factory.loads(), 4);
    assert_eq!(stack.gateway.state(), GatewayState::Ready);
}

#[tokio::test]
async fn test_init_backoff_grows_between_attempts() {
    let stack = MockStack::new(
        MockEmbedder::new(DIM),
        GatewayConfig::default().with_init_retries(3, Duration::from_millis(20)),
    );
    stack.factory.fail_next(2);

    let started = Instant::now();
    stack.gateway.warm_up().await.expect("third attempt succeeds");

    // 20ms after the first failure, 40ms after the second.
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(stack.factory.loads(), 3);
}

#[tokio::test]
async fn test_rate_limited_call_does_no_work() {
    let stack = MockStack::new(
        MockEmbedder::new(DIM),
        fast_config().with_rate_limit(1, Duration::from_secs(3600)),
    );

    stack
        .gateway
        .encode(&strings(&["a"]), "caller")
        .await
        .expect("first");
    let hits_before = stack.gateway.cache().stats().hits;
    let misses_before = stack.gateway.cache().stats().misses;

    let err = stack
        .gateway
        .encode(&strings(&["a"]), "caller")
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(stack.mock().calls(), 1);
    assert_eq!(stack.gateway.cache().stats().hits, hits_before);
    assert_eq!(stack.gateway.cache().stats().misses, misses_before);
}
