mod common;

use common::{ALICE_TOKEN, BOB_TOKEN, TestApp, bearer};
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_list_links_for_owner_only() {
    let app = TestApp::new();
    let mine = app.seed_link("alice", "alice01", "https://a.example").await;
    app.seed_link("bob", "bob0001", "https://b.example").await;
    app.seed_clicks(mine.id, 3).await;

    let response = app
        .server
        .get("/api/links")
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let items = body["items"].as_array().unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["short_code"], "alice01");
    assert_eq!(items[0]["short_url"], "https://sl.example/alice01");
    assert_eq!(items[0]["clicks"], 3);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["page_size"], 25);
}

#[tokio::test]
async fn test_list_links_paginates() {
    let app = TestApp::new();
    for i in 0..5 {
        app.seed_link("alice", &format!("page{i:03}"), "https://a.example")
            .await;
    }

    let response = app
        .server
        .get("/api/links")
        .add_query_param("page", 2)
        .add_query_param("page_size", 2)
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["total_pages"], 3);
}

#[tokio::test]
async fn test_list_links_rejects_bad_page_size() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/links")
        .add_query_param("page_size", 1000)
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_link_clicks_total() {
    let app = TestApp::new();
    let link = app.seed_link("alice", "clicks1", "https://a.example").await;
    app.seed_clicks(link.id, 4).await;

    let response = app
        .server
        .get(&format!("/api/links/{}/clicks", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["link_id"], link.id.to_string());
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn test_link_clicks_hidden_from_other_owner() {
    let app = TestApp::new();
    let link = app.seed_link("alice", "clicks2", "https://a.example").await;

    let response = app
        .server
        .get(&format!("/api/links/{}/clicks", link.id))
        .add_header("Authorization", bearer(BOB_TOKEN))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_delete_link() {
    let app = TestApp::new();
    let link = app.seed_link("alice", "delete1", "https://a.example").await;

    let response = app
        .server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), 204);

    let stored = app.store.links().await;
    assert!(stored[0].deleted_at.is_some());

    // Nothing was cached, so the code no longer resolves.
    let response = app.server.get("/delete1").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_deleted_link_served_from_cache_until_expiry() {
    let app = TestApp::new();
    let link = app.seed_link("alice", "sticky1", "https://a.example").await;

    assert_eq!(app.server.get("/sticky1").await.status_code(), 307);

    app.server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(app.server.get("/sticky1").await.status_code(), 307);
}

#[tokio::test]
async fn test_delete_link_of_other_owner_is_not_found() {
    let app = TestApp::new();
    let link = app.seed_link("alice", "delete2", "https://a.example").await;

    let response = app
        .server
        .delete(&format!("/api/links/{}", link.id))
        .add_header("Authorization", bearer(BOB_TOKEN))
        .await;

    assert_eq!(response.status_code(), 404);
    assert!(app.store.links().await[0].deleted_at.is_none());
}

#[tokio::test]
async fn test_delete_unknown_link_is_not_found() {
    let app = TestApp::new();

    let response = app
        .server
        .delete(&format!("/api/links/{}", Uuid::new_v4()))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_secure_routes_are_rate_limited() {
    let app = TestApp::with_rate_limit();

    let mut statuses = Vec::new();
    for _ in 0..12 {
        let response = app
            .server
            .get("/api/links")
            .add_header("Authorization", bearer(ALICE_TOKEN))
            .await;
        statuses.push(response.status_code().as_u16());
    }

    assert!(statuses[..10].iter().all(|&s| s == 200));
    assert_eq!(statuses[11], 429);
}
