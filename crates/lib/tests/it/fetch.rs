//! Outbound fetch tests, including the SSRF path to the loopback target.

use std::time::{Duration, Instant};

use ctfweb::{
    Fetcher,
    constants::{SSRF_FLAG, TARGET_HINT},
};

use super::helpers::*;

#[tokio::test]
async fn test_fetch_reaches_loopback_secret() {
    let mut target = start_target().await;
    let fetcher = Fetcher::new().unwrap();

    let response = fetcher.fetch(&target.secret_url()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.body.contains(SSRF_FLAG));

    target.stop();
}

#[tokio::test]
async fn test_non_success_status_is_not_an_error() {
    let mut target = start_target().await;
    let fetcher = Fetcher::new().unwrap();

    let url = format!("http://{}/admin", target.address());
    let response = fetcher.fetch(&url).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, TARGET_HINT);

    target.stop();
}

#[tokio::test]
async fn test_refused_connection_is_fetch_error() {
    // Grab a free port, then release it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let fetcher = Fetcher::new().unwrap();

    let started = Instant::now();
    let err = fetcher
        .fetch(&format!("http://127.0.0.1:{port}/"))
        .await
        .unwrap_err();

    assert!(err.is_fetch_error());
    assert!(started.elapsed() < Duration::from_secs(6));
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn test_silent_host_times_out() {
    // Accepts connections but never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _hold = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let fetcher = Fetcher::with_timeout(Duration::from_millis(300)).unwrap();
    let started = Instant::now();
    let err = fetcher
        .fetch(&format!("http://{addr}/"))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_malformed_url_is_fetch_error() {
    let fetcher = Fetcher::new().unwrap();

    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert!(err.is_fetch_error());
    assert!(!err.is_timeout());
    assert!(err.to_string().contains("not a url"));

    let ctfweb::Error::Fetch(fetch_err) = err else {
        panic!("expected a fetch error");
    };
    assert_eq!(fetch_err.url(), Some("not a url"));
}
