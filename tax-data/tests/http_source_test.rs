//! Integration tests for the HTTP bracket source and the provider on top of
//! it, run against a throwaway upstream bound to a random local port.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use tax_core::TaxBracket;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tax_data::{
    BracketDataProvider, BracketSource, FetchError, HttpBracketSource, RetryPolicy, TaxDataCache,
};

const PREFIX: &str = "/tax-calculator/tax-year";

/// Per-year call counters so tests can see how often the upstream was hit.
#[derive(Clone, Default)]
struct Upstream {
    flaky_calls: Arc<AtomicU32>,
    down_calls: Arc<AtomicU32>,
}

fn brackets_2021() -> serde_json::Value {
    json!({
        "tax_brackets": [
            { "min": 0, "max": 50197, "rate": 0.15 },
            { "min": 50197, "max": 100392, "rate": 0.205 },
            { "min": 100392, "rate": 0.26 }
        ]
    })
}

/// Behaviour by year:
/// - 2021: brackets
/// - 2006: 404
/// - 2030: 500 on the first call, brackets afterwards
/// - 2040: always 503
/// - 2050: 200 with a body that is not bracket data
/// - 2060: answers after two seconds
async fn tax_year(
    State(upstream): State<Upstream>,
    Path(year): Path<i32>,
) -> Response {
    match year {
        2021 => Json(brackets_2021()).into_response(),
        2030 => {
            if upstream.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                (StatusCode::INTERNAL_SERVER_ERROR, "try again").into_response()
            } else {
                Json(brackets_2021()).into_response()
            }
        }
        2040 => {
            upstream.down_calls.fetch_add(1, Ordering::SeqCst);
            (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").into_response()
        }
        2050 => Json(json!({ "brackets": "soon" })).into_response(),
        2060 => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(brackets_2021()).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "unknown tax year").into_response(),
    }
}

async fn spawn_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route(&format!("{PREFIX}/:year"), get(tax_year))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub upstream");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub upstream failed");
    });

    format!("http://{addr}{PREFIX}")
}

fn source(base_url: &str) -> HttpBracketSource {
    HttpBracketSource::new(base_url, Duration::from_millis(500)).expect("Failed to build client")
}

fn provider(base_url: &str) -> BracketDataProvider<HttpBracketSource> {
    BracketDataProvider::new(
        source(base_url),
        TaxDataCache::new(NonZeroUsize::new(4).unwrap()),
        RetryPolicy::new(3)
            .with_base_delay(Duration::from_millis(5))
            .with_jitter(false),
    )
}

#[tokio::test]
async fn test_fetch_decodes_brackets() {
    let base_url = spawn_upstream(Upstream::default()).await;

    let data = source(&base_url)
        .fetch_year(2021)
        .await
        .expect("Failed to fetch 2021");

    assert_eq!(data.brackets.len(), 3);
    assert_eq!(
        data.brackets[0],
        TaxBracket {
            min: dec!(0),
            max: Some(dec!(50197)),
            rate: dec!(0.15),
        }
    );
    assert_eq!(data.brackets[1].rate, dec!(0.205));
    assert_eq!(data.brackets[2].max, None);
}

#[tokio::test]
async fn test_not_found_is_terminal() {
    let base_url = spawn_upstream(Upstream::default()).await;

    let err = source(&base_url).fetch_year(2006).await.unwrap_err();

    assert!(matches!(err, FetchError::Client { status: 404, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_service_unavailable_is_transient() {
    let base_url = spawn_upstream(Upstream::default()).await;

    let err = source(&base_url).fetch_year(2040).await.unwrap_err();

    assert!(matches!(err, FetchError::Server { status: 503, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let base_url = spawn_upstream(Upstream::default()).await;

    let err = source(&base_url).fetch_year(2050).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let base_url = spawn_upstream(Upstream::default()).await;

    let err = source(&base_url).fetch_year(2060).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
    assert!(err.is_transient());
}

/// Upstream that answers 200 with a promised body it never finishes
/// sending. Returns its base URL and a count of accepted connections.
async fn spawn_stalling_upstream() -> (String, Arc<AtomicU32>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stalling upstream");
    let addr = listener.local_addr().expect("Failed to read local address");
    let connections = Arc::new(AtomicU32::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"tax_brackets\": [",
                    )
                    .await;
                let _ = stream.flush().await;
                tokio::time::sleep(Duration::from_secs(5)).await;
            });
        }
    });

    (format!("http://{addr}{PREFIX}"), connections)
}

#[tokio::test]
async fn test_stalled_body_is_transient() {
    let (base_url, _) = spawn_stalling_upstream().await;

    let err = HttpBracketSource::new(&base_url, Duration::from_millis(300))
        .expect("Failed to build client")
        .fetch_year(2021)
        .await
        .unwrap_err();

    assert!(!matches!(err, FetchError::Decode(_)), "got {err:?}");
    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn test_provider_retries_stalled_body() {
    let (base_url, connections) = spawn_stalling_upstream().await;
    let provider = BracketDataProvider::new(
        HttpBracketSource::new(&base_url, Duration::from_millis(300)).expect("Failed to build client"),
        TaxDataCache::new(NonZeroUsize::new(4).unwrap()),
        RetryPolicy::new(3)
            .with_base_delay(Duration::from_millis(5))
            .with_jitter(false),
    );

    let err = provider.fetch(2021).await.unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }), "got {err:?}");
    assert_eq!(connections.load(Ordering::SeqCst), 3);
    assert!(provider.cache().is_empty());
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source(&format!("http://{addr}{PREFIX}"))
        .fetch_year(2021)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_provider_recovers_from_server_error() {
    let upstream = Upstream::default();
    let base_url = spawn_upstream(upstream.clone()).await;
    let provider = provider(&base_url);

    let data = provider.fetch(2030).await.expect("retry should recover");

    assert_eq!(data.brackets.len(), 3);
    assert_eq!(upstream.flaky_calls.load(Ordering::SeqCst), 2);
    assert!(provider.cache().contains(2030));
}

#[tokio::test]
async fn test_provider_gives_up_on_persistent_outage() {
    let upstream = Upstream::default();
    let base_url = spawn_upstream(upstream.clone()).await;
    let provider = provider(&base_url);

    let err = provider.fetch(2040).await.unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }));
    assert_eq!(err.status(), Some(503));
    assert_eq!(upstream.down_calls.load(Ordering::SeqCst), 3);
    assert!(provider.cache().is_empty());
}

#[tokio::test]
async fn test_provider_serves_repeat_requests_from_cache() {
    let upstream = Upstream::default();
    let base_url = spawn_upstream(upstream.clone()).await;
    let provider = provider(&base_url);

    provider.fetch(2030).await.unwrap();
    provider.fetch(2030).await.unwrap();
    provider.fetch(2030).await.unwrap();

    // One failure plus one success; the rest came from the cache.
    assert_eq!(upstream.flaky_calls.load(Ordering::SeqCst), 2);
}
