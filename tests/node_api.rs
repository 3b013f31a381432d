//! Integration tests for the worker node HTTP surface
//!
//! Each test runs a real node on an ephemeral port and talks to it with reqwest.

mod common;

use common::{read_archive, spawn_node};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Fresh node serves the placeholder to curl
#[tokio::test]
async fn test_curl_gets_placeholder_before_ingestion() {
    let node = spawn_node(&["hunter2"]).await;
    let client = reqwest::Client::new();

    let response = client
        .get(node.url())
        .header("User-Agent", "curl/8.5.0")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "flag: None\n");
}

/// Ingestion returns the password, seals the zip shard, and switches what is served
#[tokio::test]
async fn test_set_config_then_expose() {
    let node = spawn_node(&["hunter2"]).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/set-config", node.url()))
        .json(&json!({"zip": "ABC", "web": "DEF", "curl": "GHI"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["zip_password"], "hunter2");
    assert_eq!(read_archive(&node.archive_path, "hunter2"), "ABC");

    let curl = client
        .get(node.url())
        .header("User-Agent", "CURL/7.0")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(curl, "flag: GHI\n");

    let browser = client
        .get(node.url())
        .header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)")
        .send()
        .await
        .unwrap();
    let content_type = browser.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = browser.text().await.unwrap();
    assert!(html.contains("<flag>FLAG{DEF}</flag>"));
    assert!(!html.contains("GHI"));
}

/// Requests without a User-Agent are treated as browsers
#[tokio::test]
async fn test_missing_user_agent_gets_html() {
    let node = spawn_node(&["pw"]).await;

    let html = reqwest::get(node.url()).await.unwrap().text().await.unwrap();
    assert!(html.contains("FLAG{None}"));
}

/// Web shard markup is escaped
#[tokio::test]
async fn test_web_shard_is_html_escaped() {
    let node = spawn_node(&["pw"]).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/set-config", node.url()))
        .json(&json!({"zip": "z", "web": "<script>alert(1)</script>", "curl": "c"}))
        .send()
        .await
        .unwrap();

    let html = client
        .get(node.url())
        .header("User-Agent", "Mozilla/5.0")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

/// Invalid payloads are rejected and leave the node untouched
#[tokio::test]
async fn test_invalid_payloads_rejected() {
    let node = spawn_node(&["pw"]).await;
    let client = reqwest::Client::new();
    let endpoint = format!("{}/set-config", node.url());

    let empty_zip = client
        .post(&endpoint)
        .json(&json!({"zip": "   ", "web": "w", "curl": "c"}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_zip.status(), StatusCode::BAD_REQUEST);

    let missing_field = client
        .post(&endpoint)
        .json(&json!({"zip": "z", "web": "w"}))
        .send()
        .await
        .unwrap();
    assert!(missing_field.status().is_client_error());

    let not_json = client
        .post(&endpoint)
        .header("Content-Type", "application/json")
        .body("zip=z")
        .send()
        .await
        .unwrap();
    assert!(not_json.status().is_client_error());

    let too_long = client
        .post(&endpoint)
        .json(&json!({"zip": "z", "web": "w".repeat(2000), "curl": "c"}))
        .send()
        .await
        .unwrap();
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);

    assert!(!node.archive_path.exists());
    let curl = client
        .get(node.url())
        .header("User-Agent", "curl/8.0")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(curl, "flag: None\n");
}

/// Legacy field names are accepted
#[tokio::test]
async fn test_legacy_field_names() {
    let node = spawn_node(&["pw"]).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/set-config", node.url()))
        .json(&json!({"zip_flag": "z1", "web_flag": "w1", "curl_flag": "c1"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_archive(&node.archive_path, "pw"), "z1");
}

/// Later ingestion replaces the archive and the served shards
#[tokio::test]
async fn test_second_ingestion_replaces_first() {
    let node = spawn_node(&["only"]).await;
    let client = reqwest::Client::new();
    let endpoint = format!("{}/set-config", node.url());

    for (zip, curl) in [("first", "c1"), ("second", "c2")] {
        let response = client
            .post(&endpoint)
            .json(&json!({"zip": zip, "web": "w", "curl": curl}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    assert_eq!(read_archive(&node.archive_path, "only"), "second");
    let curl = client
        .get(node.url())
        .header("User-Agent", "curl/8.0")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(curl, "flag: c2\n");
}

/// Health endpoint reports liveness
#[tokio::test]
async fn test_health_check() {
    let node = spawn_node(&["pw"]).await;

    let body: Value = reqwest::get(format!("{}/api/health", node.url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}
