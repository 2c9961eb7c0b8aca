//! tests/event_source_tests.rs
use huedmx_control::hue::{EventSource, HueBridge};
use huedmx_core::BridgeConfig;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

const STREAM_HEADERS: &[u8] =
    b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";
const WAIT: Duration = Duration::from_secs(10);

/// Accept one connection and check it asks for the event stream
async fn accept_stream_request(listener: &TcpListener) -> TcpStream {
    let (mut socket, _) = timeout(WAIT, listener.accept())
        .await
        .expect("no connection from the event source")
        .unwrap();

    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed before the request was complete");
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request).to_lowercase();
    assert!(request.starts_with("get /eventstream/clip/v2 "), "{}", request);
    assert!(request.contains("hue-application-key: test-key"), "{}", request);
    assert!(request.contains("accept: text/event-stream"), "{}", request);
    socket
}

#[tokio::test]
async fn test_event_source_skips_bad_blocks_and_reconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bridge =
        HueBridge::with_base_url(format!("http://{}", listener.local_addr().unwrap()), "test-key")
            .unwrap();
    let config = BridgeConfig {
        event_timeout_secs: 1,
        reconnect_backoff_secs: 1,
        heartbeat_secs: 0,
        ..Default::default()
    };
    let (tx, mut rx) = mpsc::channel(16);
    let source = tokio::spawn(EventSource::new(bridge, &config).run(tx));

    // First connection: keep-alive, a broken block, a good one, then close
    let mut first = accept_stream_request(&listener).await;
    first.write_all(STREAM_HEADERS).await.unwrap();
    first.write_all(b": hi\n\n").await.unwrap();
    first.write_all(b"data: [{\"type\":\n\n").await.unwrap();
    first
        .write_all(b"data: [{\"type\":\"update\",\"data\":[{\"id\":\"light-1\",\"type\":\"light\"}]}]\n\n")
        .await
        .unwrap();
    first.flush().await.unwrap();

    let event = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(event.is_update());
    assert_eq!(event.changed_ids().collect::<Vec<_>>(), vec!["light-1"]);

    first.shutdown().await.unwrap();
    drop(first);
    let closed_at = Instant::now();

    // Second connection arrives only after the backoff, then goes quiet
    let mut second = accept_stream_request(&listener).await;
    assert!(closed_at.elapsed() >= Duration::from_millis(900));
    second.write_all(STREAM_HEADERS).await.unwrap();
    second.flush().await.unwrap();
    let quiet_from = Instant::now();

    // Idle timeout plus backoff before the third
    let _third = accept_stream_request(&listener).await;
    assert!(quiet_from.elapsed() >= Duration::from_millis(1900));
    drop(second);

    assert!(rx.try_recv().is_err());
    source.abort();
}
