//! SSRF target lifecycle tests.

use std::time::Duration;

use ctfweb::constants::SSRF_FLAG;

use super::helpers::*;

#[tokio::test]
async fn test_target_serves_secret_as_plain_text() {
    let mut target = start_target().await;
    assert!(target.is_running());
    assert!(target.address().ip().is_loopback());

    let response = reqwest::get(target.secret_url()).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/plain"
    );
    assert_eq!(response.text().await.unwrap(), SSRF_FLAG);

    target.stop();
    assert!(!target.is_running());
}

#[tokio::test]
async fn test_target_stops_accepting_after_stop() {
    let mut target = start_target().await;
    let url = target.secret_url();
    target.stop();

    // Give the graceful shutdown a moment to close the listener
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let mut refused = false;
    for _ in 0..20 {
        if client.get(&url).send().await.is_err() {
            refused = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(refused);
}
