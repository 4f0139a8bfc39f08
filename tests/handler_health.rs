mod common;

use common::TestApp;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_cache_down() {
    let app = TestApp::new();
    app.cache.set_unavailable(true);

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_click_queue_closed() {
    let TestApp {
        server, click_rx, ..
    } = TestApp::new();
    drop(click_rx);

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<Value>();
    assert_eq!(json["checks"]["click_queue"]["status"], "error");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let response = app.server.get("/health").await;

    assert_ne!(response.status_code(), 401);
}
