//! Download streaming, progress reporting, and atomic finalize.

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use updraft::core::LauncherError;
use updraft::download::{DownloadProgress, Downloader};
use updraft::install;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deterministic_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn download_with_known_size_reports_monotonic_percentages() {
    let body = deterministic_bytes(64 * 1024);
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/asset.AppImage"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/asset.AppImage"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("app.AppImage.part");
    let mut events: Vec<DownloadProgress> = Vec::new();

    let staged = Downloader::new()
        .unwrap()
        .download(
            &format!("{}/asset.AppImage", server.uri()),
            &staging,
            |p| events.push(p),
        )
        .await
        .unwrap();

    assert_eq!(staged.bytes, body.len() as u64);
    assert!(!events.is_empty());

    // Total known on every event, percentages monotonically
    // non-decreasing, finishing at 100.
    let mut last = 0u8;
    for event in &events {
        assert_eq!(event.total_bytes, body.len() as i64);
        let pct = event.percent().expect("total is known");
        assert!(pct >= last, "percent went backwards: {pct} < {last}");
        last = pct;
    }
    assert_eq!(last, 100);
    assert_eq!(events.last().unwrap().bytes_read, body.len() as u64);

    assert_eq!(std::fs::read(&staging).unwrap(), body);
}

#[tokio::test]
async fn promote_yields_identical_destination_and_no_staging_sibling() {
    let body = deterministic_bytes(8 * 1024);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/asset.AppImage"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let destination = tmp.path().join("app.AppImage");
    let staging = tmp.path().join("app.AppImage.part");

    let staged = Downloader::new()
        .unwrap()
        .download(&format!("{}/asset.AppImage", server.uri()), &staging, |_| {})
        .await
        .unwrap();

    install::promote(&staged.path, &destination).unwrap();

    assert_eq!(std::fs::read(&destination).unwrap(), body);
    assert!(!staging.exists(), "no staging sibling may remain");
}

#[tokio::test]
async fn stale_partial_file_is_truncated_before_downloading() {
    let body = deterministic_bytes(1024);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/asset.AppImage"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("app.AppImage.part");
    std::fs::write(&staging, deterministic_bytes(900_000)).unwrap();

    Downloader::new()
        .unwrap()
        .download(&format!("{}/asset.AppImage", server.uri()), &staging, |_| {})
        .await
        .unwrap();

    assert_eq!(std::fs::read(&staging).unwrap(), body);
}

/// Answers every connection with a Content-Length larger than what it
/// actually sends, then drops the connection mid-body. The size probe
/// and the download each open their own connection.
async fn truncating_server(body_sent: usize, body_claimed: usize) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let header = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {body_claimed}\r\nconnection: close\r\n\r\n"
            );
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(&deterministic_bytes(body_sent)).await;
            let _ = socket.flush().await;
            // Dropping the socket cuts the body short.
        }
    });
    addr
}

#[tokio::test]
async fn mid_stream_failure_removes_the_staging_file() {
    let addr = truncating_server(10_000, 200_000).await;

    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("app.AppImage.part");
    let mut saw_progress = false;

    let err = Downloader::new()
        .unwrap()
        .download(&format!("http://{addr}/asset.AppImage"), &staging, |_| {
            saw_progress = true;
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::Network { .. }));
    assert!(saw_progress, "some bytes should have streamed before the cut");
    assert!(
        !staging.exists(),
        "partial staging file must be deleted on failure"
    );
}

/// Answers every connection with a chunked response (no Content-Length
/// at all).
async fn chunked_server(chunks: usize, chunk_len: usize) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n",
                )
                .await;
            for _ in 0..chunks {
                let chunk = deterministic_bytes(chunk_len);
                let _ = socket.write_all(format!("{chunk_len:x}\r\n").as_bytes()).await;
                let _ = socket.write_all(&chunk).await;
                let _ = socket.write_all(b"\r\n").await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
            let _ = socket.flush().await;
        }
    });
    addr
}

#[tokio::test]
async fn unknown_total_reports_bytes_only() {
    let addr = chunked_server(4, 2048).await;

    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("app.AppImage.part");
    let mut events: Vec<DownloadProgress> = Vec::new();

    let staged = Downloader::new()
        .unwrap()
        .download(&format!("http://{addr}/asset.AppImage"), &staging, |p| {
            events.push(p);
        })
        .await
        .unwrap();

    assert_eq!(staged.bytes, 4 * 2048);
    assert!(!events.is_empty());
    for event in &events {
        assert_eq!(event.total_bytes, -1);
        assert_eq!(event.percent(), None);
    }

    // Byte counts still advance monotonically.
    let mut last = 0;
    for event in &events {
        assert!(event.bytes_read >= last);
        last = event.bytes_read;
    }
    assert_eq!(last, 4 * 2048);
}

#[tokio::test]
async fn http_error_status_fails_without_creating_a_staging_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/asset.AppImage"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let staging = tmp.path().join("app.AppImage.part");

    let err = Downloader::new()
        .unwrap()
        .download(&format!("{}/asset.AppImage", server.uri()), &staging, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LauncherError::Network { .. }));
    assert!(!staging.exists());
}
