//! HTTP integration tests driving the router in-process.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["status"], "ok");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/documents", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "UNAUTHORIZED");

    let response = app.request("GET", "/api/documents", None, Some("garbage")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_principal_is_rejected() {
    let app = TestApp::new().await;
    let (ada, token) = app.user("ada@example.com").await;
    app.disable(&ada).await;

    let response = app.request("GET", "/api/documents", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_versions_and_duplicates() {
    let app = TestApp::new().await;
    let (_, token) = app.user("ada@example.com").await;

    let first = app.upload(&token, "/doc", "notes.txt", "v1").await;
    assert_eq!(first.status, StatusCode::CREATED);
    let body = first.json();
    assert_eq!(body["version"], 1);
    assert_eq!(body["checksum"].as_str().map(str::len), Some(64));
    assert!(body["document"].get("blob_handle").is_none());

    let second = app.upload(&token, "/doc", "notes.txt", "v2").await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(second.json()["version"], 2);

    let dup = app.upload(&token, "/doc", "notes.txt", "v1").await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.json()["error"], "DUPLICATE_CONTENT");

    let listed = app.request("GET", "/api/documents", None, Some(&token)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.json()["data"].as_array().map(Vec::len), Some(1));

    let root_id = body["document"]["id"].as_str().expect("id").to_string();
    let detail = app
        .request("GET", &format!("/api/documents/{root_id}"), None, Some(&token))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json()["data"]["versions"][0]["version_number"], 2);
}

#[tokio::test]
async fn test_download_by_path_with_header_and_query_token() {
    let app = TestApp::new().await;
    let (_, token) = app.user("ada@example.com").await;
    app.upload(&token, "/reports/q1", "q1.txt", "first").await;
    app.upload(&token, "/reports/q1", "q1.txt", "second").await;

    let latest = app.request("GET", "/api/files/reports/q1", None, Some(&token)).await;
    assert_eq!(latest.status, StatusCode::OK);
    assert_eq!(latest.bytes, b"second");
    let disposition = latest.headers[header::CONTENT_DISPOSITION].to_str().expect("header");
    assert!(disposition.contains("q1.txt"));

    let first = app
        .request("GET", &format!("/api/files/reports/q1?revision=1&token={token}"), None, None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.bytes, b"first");

    let missing = app
        .request("GET", "/api/files/reports/q1?revision=7", None, Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let anonymous = app.request("GET", "/api/files/reports/q1", None, None).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);
    let anonymous = app.request("GET", "/api/files/no/such/file", None, None).await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);

    let encoded = token.replace('.', "%2E");
    let decoded = app
        .request("GET", &format!("/api/files/reports/q1?token={encoded}"), None, None)
        .await;
    assert_eq!(decoded.status, StatusCode::OK);
    assert_eq!(decoded.bytes, b"second");
}

#[tokio::test]
async fn test_share_flow() {
    let app = TestApp::new().await;
    let (_, ada) = app.user("ada@example.com").await;
    let (_, bob) = app.user("bob@example.com").await;

    let created = app.upload(&ada, "/team/plan", "plan.md", "# v1").await.json();
    let doc_id = created["document"]["id"].as_str().expect("id").to_string();

    let denied = app.request("GET", "/api/files/team/plan", None, Some(&bob)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let shared = app
        .request(
            "POST",
            "/api/share",
            Some(json!({ "file_id": doc_id, "user_email": "bob@example.com", "can_edit": false })),
            Some(&ada),
        )
        .await;
    assert_eq!(shared.status, StatusCode::OK);
    assert_eq!(shared.json()["permissions"], json!(["view"]));

    let allowed = app.request("GET", "/api/files/team/plan", None, Some(&bob)).await;
    assert_eq!(allowed.status, StatusCode::OK);

    let listing = app.request("GET", "/api/documents/shared", None, Some(&bob)).await;
    let data = listing.json()["data"].clone();
    assert_eq!(data[0]["owner_email"], "ada@example.com");

    let upload = app.upload(&bob, "/team/plan", "plan.md", "# bob").await;
    assert_eq!(upload.status, StatusCode::FORBIDDEN);

    let grants = app
        .request("GET", &format!("/api/documents/{doc_id}/grants"), None, Some(&ada))
        .await;
    assert_eq!(grants.json()["data"][0]["email"], "bob@example.com");

    let bad = app
        .request(
            "POST",
            "/api/share",
            Some(json!({ "file_id": doc_id, "user_email": "nope" })),
            Some(&ada),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let revoked = app
        .request(
            "DELETE",
            "/api/share",
            Some(json!({ "file_id": doc_id, "user_email": "bob@example.com" })),
            Some(&ada),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.json()["removed"], 1);

    let gone = app
        .request("GET", &format!("/api/documents/{doc_id}"), None, Some(&bob))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare() {
    let app = TestApp::new().await;
    let (_, token) = app.user("ada@example.com").await;

    let left = app.upload(&token, "/doc", "a.txt", "left text").await.json();
    let right = app.upload(&token, "/doc", "a.txt", "right text").await.json();
    let left_id = left["document"]["id"].as_str().expect("id").to_string();
    let right_id = right["document"]["id"].as_str().expect("id").to_string();

    let response = app
        .request(
            "GET",
            &format!("/api/compare?left_id={left_id}&right_id={right_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.json()["data"].clone();
    assert_eq!(data["left"]["text"], "left text");
    assert_eq!(data["right"]["text"], "right text");

    let incomplete = app
        .request("GET", &format!("/api/compare?left_id={left_id}"), None, Some(&token))
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);
}
