//! Integration tests for the HTTP client against an in-process stub server.
//!
//! Each test binds a throwaway HTTP/1.1 responder on `127.0.0.1:0`, points a
//! `CollectorClient` at it, and checks both the requests the SDK sends and
//! how it decodes the responses.
//!
//! Run with:
//! ```bash
//! cargo test --test http_integration
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use kline_collector_sdk::prelude::*;

// ─── Stub server ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: String,
    body: String,
}

/// Status, extra headers, body.
type Reply = (u16, Vec<(&'static str, String)>, String);

type Handler = Arc<dyn Fn(&Recorded) -> Reply + Send + Sync>;

struct Stub {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn client(&self) -> CollectorClient {
        self.client_with_retry(
            RetryConfig::idempotent()
                .with_initial_delay(Duration::from_millis(5))
                .with_jitter(false),
        )
    }

    fn client_with_retry(&self, retry: RetryConfig) -> CollectorClient {
        CollectorClient::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(5))
            .retry(retry)
            .build()
            .expect("client should build")
    }
}

async fn spawn_stub(handler: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Stub {
    spawn_stub_with_headers(move |req| {
        let (status, body) = handler(req);
        (status, Vec::new(), body)
    })
    .await
}

async fn spawn_stub_with_headers(handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Stub {
    let handler: Handler = Arc::new(handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let Some(req) = read_request(&mut socket).await else {
                    return;
                };
                let (status, headers, body) = handler(&req);
                log.lock().unwrap().push(req);
                let extra: String = headers
                    .iter()
                    .map(|(name, value)| format!("{}: {}\r\n", name, value))
                    .collect();
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    extra,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Stub {
        base_url: format!("http://{}", addr),
        requests,
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target, String::new()),
    };
    Some(Recorded {
        method,
        path,
        query,
        body,
    })
}

fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

// ─── Collection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_posts_request_body() {
    let stub = spawn_stub(|_| ok(r#"{"success": true, "message": "started"}"#)).await;
    let client = stub.client();

    let request = StartCollectionRequest::new("BTC-USDT", "1h", "2025-01-01")
        .end_time("2025-07-02")
        .batch_size(1000);
    let resp = client.collection().start(&request).await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("started"));

    let reqs = stub.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].path, "/api/data-collection/start");
    let body: serde_json::Value = serde_json::from_str(&reqs[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "symbol": "BTC-USDT",
            "interval": "1h",
            "start_time": "2025-01-01",
            "end_time": "2025-07-02",
            "batch_size": 1000
        })
    );
}

#[tokio::test]
async fn start_rejection_is_an_error() {
    let stub = spawn_stub(|_| ok(r#"{"success": false, "error": "collection already running"}"#)).await;
    let client = stub.client();

    let request = StartCollectionRequest::new("BTC-USDT", "1h", "2025-01-01");
    let err = client.collection().start(&request).await.unwrap_err();
    assert!(matches!(err, SdkError::Rejected(ref reason) if reason == "collection already running"));
}

#[tokio::test]
async fn start_is_not_retried() {
    let stub = spawn_stub(|_| (503, "busy".to_string())).await;
    let client = stub.client();

    let request = StartCollectionRequest::new("BTC-USDT", "1h", "2025-01-01");
    let err = client.collection().start(&request).await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::Http(HttpError::ServerError { status: 503, .. })
    ));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn stop_accepts_empty_body() {
    let stub = spawn_stub(|_| ok("")).await;
    let client = stub.client();

    let resp = client.collection().stop().await.unwrap();
    assert_eq!(resp, ActionResponse::default());

    let reqs = stub.requests();
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].path, "/api/data-collection/stop");
    assert!(reqs[0].body.is_empty());
}

#[tokio::test]
async fn status_is_converted() {
    let stub = spawn_stub(|_| {
        ok(r#"{"is_collecting": true, "symbol": "ETH-USDT", "interval": "15m",
               "progress": 37.5, "total_collected": 375, "batch_count": 4,
               "current_batch_start": "2025-01-04 00:00:00", "batch_size": 96}"#)
    })
    .await;
    let client = stub.client();

    let status = client.collection().status().await.unwrap();
    assert!(status.is_collecting);
    assert_eq!(status.symbol, Some(Symbol::from("ETH-USDT")));
    assert_eq!(status.total_collected, 375);
    assert_eq!(status.batch_size, 96);
    assert_eq!(status.current_batch_end, None);
    assert_eq!(stub.requests()[0].path, "/api/data-collection/status");
}

#[tokio::test]
async fn history_sends_only_given_filters() {
    let stub = spawn_stub(|_| {
        ok(r#"{"history": [{"id": 3, "symbol": "BTC-USDT", "interval": "1h",
                            "total_collected": 4368, "status": "completed"}]}"#)
    })
    .await;
    let client = stub.client();

    let records = client
        .collection()
        .history(&HistoryQuery::new().symbol("BTC-USDT").limit(10))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_deref(), Some("3"));
    assert_eq!(records[0].total_collected, 4368);

    let reqs = stub.requests();
    assert_eq!(reqs[0].path, "/api/data-collection/history");
    assert_eq!(reqs[0].query, "symbol=BTC-USDT&limit=10");
}

#[tokio::test]
async fn symbols_are_cached_between_sub_clients() {
    let stub = spawn_stub(|req| match req.path.as_str() {
        "/api/data-collection/symbols" => ok(r#"["BTC-USDT", "ETH-USDT"]"#),
        "/api/data-collection/intervals" => ok(r#"{"intervals": ["1m", "1h"]}"#),
        _ => (404, "no route".to_string()),
    })
    .await;
    let client = stub.client();

    let first = client.collection().symbols().await.unwrap();
    let second = client.market_data().symbols().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    let intervals = client.market_data().intervals().await.unwrap();
    assert_eq!(intervals, vec![Interval::from("1m"), Interval::from("1h")]);
    let _ = client.collection().intervals().await.unwrap();

    assert_eq!(stub.requests().len(), 2);

    client.clear_all_caches().await;
    let _ = client.collection().symbols().await.unwrap();
    assert_eq!(stub.requests().len(), 3);
}

// ─── Market data ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn klines_omit_absent_filters() {
    let stub = spawn_stub(|_| {
        ok(r#"{"data": [
            {"timestamp": 1735689600000, "open": 93000, "high": 93600, "low": 92900, "close": 93500, "volume": "12.5"},
            {"timestamp": 1735693200000, "open": 93500, "high": 93700, "low": 93100, "close": 93200, "volume": "8"}
        ]}"#)
    })
    .await;
    let client = stub.client();

    let klines = client
        .market_data()
        .klines(&KlineQuery::new("BTC-USDT", "1h"))
        .await
        .unwrap();
    assert_eq!(klines.len(), 2);
    assert!(klines[0].is_bullish());
    assert!(!klines[1].is_bullish());
    assert_eq!(klines[0].volume, Decimal::new(125, 1));

    let reqs = stub.requests();
    assert_eq!(reqs[0].method, "GET");
    assert_eq!(reqs[0].path, "/api/kline-data");
    assert_eq!(reqs[0].query, "symbol=BTC-USDT&interval=1h");
}

#[tokio::test]
async fn klines_include_given_filters_and_build_series() {
    let stub = spawn_stub(|_| {
        ok(r#"[
            {"time": "2025-01-01T01:00:00Z", "open": 2, "high": 3, "low": 1, "close": 2, "volume": 1},
            {"time": "2025-01-01T00:00:00Z", "open": 1, "high": 2, "low": 1, "close": 2, "volume": 1}
        ]"#)
    })
    .await;
    let client = stub.client();

    let query = KlineQuery::new("BTC-USDT", "1h")
        .start_time("2025-01-01")
        .end_time("2025-01-02")
        .limit(2);
    let series = client.market_data().series(&query).await.unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(
        series.earliest().unwrap().open_time.to_rfc3339(),
        "2025-01-01T00:00:00+00:00"
    );

    assert_eq!(
        stub.requests()[0].query,
        "symbol=BTC-USDT&interval=1h&start_time=2025-01-01&end_time=2025-01-02&limit=2"
    );
}

#[tokio::test]
async fn market_stats_path_and_decode() {
    let stub = spawn_stub(|_| {
        ok(r#"{"high_price": 95000, "low_price": 91000.5, "avg_price": "93000",
               "total_volume": 1234, "price_change": -500, "price_change_pct": -0.53}"#)
    })
    .await;
    let client = stub.client();

    let stats = client
        .market_data()
        .stats(&Symbol::from("BTC-USDT"))
        .await
        .unwrap();
    assert_eq!(stats.symbol.as_str(), "BTC-USDT");
    assert_eq!(stats.high_price, Some(Decimal::from(95000)));
    assert_eq!(stats.price_change, Some(Decimal::from(-500)));
    assert_eq!(stub.requests()[0].path, "/api/market-stats/BTC-USDT");
}

// ─── Error handling & retries ────────────────────────────────────────────────

#[tokio::test]
async fn get_retries_transient_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stub = spawn_stub(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            (503, "warming up".to_string())
        } else {
            ok(r#"{"is_collecting": false}"#)
        }
    })
    .await;
    let client = stub.client();

    let status = client.collection().status().await.unwrap();
    assert!(!status.is_collecting);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn get_gives_up_after_max_retries() {
    let stub = spawn_stub(|_| (502, "bad gateway".to_string())).await;
    let client = stub.client();

    let err = client.collection().status().await.unwrap_err();
    assert!(matches!(
        err,
        SdkError::Http(HttpError::MaxRetriesExceeded { attempts: 4, .. })
    ));
    assert_eq!(stub.requests().len(), 4);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let stub = spawn_stub(|_| (404, "unknown symbol".to_string())).await;
    let client = stub.client();

    let err = client
        .market_data()
        .stats(&Symbol::from("NOPE-USDT"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Http(HttpError::NotFound(ref body)) if body == "unknown symbol"));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn oversized_retry_after_falls_back_to_backoff() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stub = spawn_stub_with_headers(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            (
                429,
                vec![("Retry-After", "18446744073709552".to_string())],
                "slow down".to_string(),
            )
        } else {
            (200, Vec::new(), r#"{"is_collecting": false}"#.to_string())
        }
    })
    .await;
    let client = stub.client_with_retry(
        RetryConfig::idempotent()
            .with_initial_delay(Duration::from_millis(5))
            .with_max_delay(Duration::from_millis(50))
            .with_jitter(false),
    );

    let status = tokio::time::timeout(Duration::from_secs(2), client.collection().status())
        .await
        .expect("retry should not wait on the header")
        .unwrap();
    assert!(!status.is_collecting);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rate_limit_wait_is_capped_by_max_delay() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stub = spawn_stub_with_headers(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            (429, vec![("Retry-After", "3600".to_string())], String::new())
        } else {
            (200, Vec::new(), r#"["BTC-USDT"]"#.to_string())
        }
    })
    .await;
    let client = stub.client_with_retry(
        RetryConfig::idempotent()
            .with_initial_delay(Duration::from_millis(5))
            .with_max_delay(Duration::from_millis(50))
            .with_jitter(false),
    );

    let started = std::time::Instant::now();
    let symbols = tokio::time::timeout(Duration::from_secs(2), client.collection().symbols())
        .await
        .expect("rate-limit wait should be capped")
        .unwrap();
    assert_eq!(symbols, vec![Symbol::from("BTC-USDT")]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn rate_limit_without_retries_fails_fast() {
    let stub = spawn_stub_with_headers(|_| {
        (429, vec![("Retry-After", "3600".to_string())], String::new())
    })
    .await;
    let client = stub.client_with_retry(RetryConfig::idempotent().with_max_retries(0));

    let err = tokio::time::timeout(Duration::from_secs(2), client.collection().status())
        .await
        .expect("no wait when no retry follows")
        .unwrap_err();
    assert!(matches!(
        err,
        SdkError::Http(HttpError::MaxRetriesExceeded { attempts: 1, .. })
    ));
    assert_eq!(stub.requests().len(), 1);
}

// ─── Status polling ──────────────────────────────────────────────────────────

fn polling_stub_body(call: usize) -> String {
    match call {
        0 => r#"{"is_collecting": true, "progress": 10, "total_collected": 100, "batch_count": 1, "batch_size": 100}"#,
        1 => r#"{"is_collecting": true, "progress": 20, "total_collected": 200, "batch_count": 2, "batch_size": 100}"#,
        _ => r#"{"is_collecting": false, "progress": 30, "total_collected": 300, "batch_count": 3, "batch_size": 100}"#,
    }
    .to_string()
}

#[tokio::test]
async fn watch_ends_after_job_stops() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stub = spawn_stub(move |_| (200, polling_stub_body(counter.fetch_add(1, Ordering::SeqCst)))).await;
    let client = stub.client();

    let statuses: Vec<_> = client
        .collection()
        .watch(Duration::from_millis(5))
        .collect()
        .await;
    assert_eq!(statuses.len(), 3);
    let last = statuses.last().unwrap().as_ref().unwrap();
    assert!(!last.is_collecting);
    assert_eq!(last.total_collected, 300);
}

#[tokio::test]
async fn watch_ends_after_error() {
    let stub = spawn_stub(|_| (400, "bad".to_string())).await;
    let client = stub.client();

    let statuses: Vec<_> = client
        .collection()
        .watch(Duration::from_millis(5))
        .collect()
        .await;
    assert_eq!(statuses.len(), 1);
    assert!(matches!(
        statuses[0],
        Err(SdkError::Http(HttpError::BadRequest(_)))
    ));
}

#[tokio::test]
async fn track_drives_progress_tracker() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stub = spawn_stub(move |_| (200, polling_stub_body(counter.fetch_add(1, Ordering::SeqCst)))).await;
    let client = stub.client();

    let mut tracker = ProgressTracker::new();
    tracker.start(CollectionParams {
        symbol: Symbol::from("BTC-USDT"),
        interval: Interval::from("1h"),
        start_time: "2025-01-01".to_string(),
        end_time: "2025-01-13".to_string(),
        estimated_total: Some(400),
    });

    client
        .collection()
        .track(&mut tracker, Duration::from_millis(5))
        .await
        .unwrap();

    assert!(!tracker.is_collecting());
    assert_eq!(tracker.history().len(), 3);
    assert_eq!(tracker.collected_klines(), 300);
    assert_eq!(tracker.batch_count(), 3);
    assert_eq!(tracker.progress_percentage(), 75.0);
    assert_eq!(tracker.reported_progress(), 100.0);
}
