//! Tests for DriveClient with mocked HTTP responses.

use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;

use drive_scribe::auth::{Authenticator, MemoryTokenStore, TokenStore};
use drive_scribe::client::{DriveClient, MediaProvider};
use drive_scribe::error::ScribeError;
use drive_scribe::models::{ClientSecrets, FileMetadata, StoredToken};

/// Authenticator whose store already holds a long-lived token, so client
/// calls never touch the token endpoint.
fn static_auth() -> Authenticator {
    let secrets: ClientSecrets = serde_json::from_value(json!({
        "installed": {
            "client_id": "client-id",
            "client_secret": "shh"
        }
    }))
    .unwrap();

    let store = MemoryTokenStore::default();
    store
        .save(&StoredToken {
            access_token: "test-token".to_string(),
            refresh_token: None,
            expires_at: u64::MAX / 2,
        })
        .unwrap();

    Authenticator::new(secrets, Arc::new(store))
}

#[tokio::test]
async fn get_metadata_parses_fields() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files/abc123")
        .match_query(Matcher::UrlEncoded("supportsAllDrives".into(), "true".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "abc123",
                "name": "lecture.mp4",
                "mimeType": "video/mp4",
                "size": "2048",
                "modifiedTime": "2024-01-01T00:00:00.000Z",
                "owners": [{"displayName": "Alice"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DriveClient::with_base_url(static_auth(), server.url());
    let metadata = client.get_metadata("abc123").await.unwrap();

    assert_eq!(metadata.name, "lecture.mp4");
    assert_eq!(metadata.size, Some(2048));
    assert_eq!(metadata.owner_display(), "Alice");
    assert_eq!(metadata.modified_display(), "2024-01-01T00:00:00.000Z");
    mock.assert_async().await;
}

#[tokio::test]
async fn get_metadata_maps_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(
            json!({"error": {"code": 404, "message": "File not found: missing"}}).to_string(),
        )
        .create_async()
        .await;

    let client = DriveClient::with_base_url(static_auth(), server.url());
    let err = client.get_metadata("missing").await.unwrap_err();

    match err {
        ScribeError::NotFound(message) => assert!(message.contains("missing")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn get_metadata_maps_permission_denied() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/locked")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(
            json!({"error": {"code": 403, "message": "The user does not have permission"}})
                .to_string(),
        )
        .create_async()
        .await;

    let client = DriveClient::with_base_url(static_auth(), server.url());
    let err = client.get_metadata("locked").await.unwrap_err();

    assert!(matches!(err, ScribeError::PermissionDenied(_)));
}

#[tokio::test]
async fn list_videos_sends_video_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "'folder1' in parents and trashed = false and mimeType contains 'video/'".into(),
        ))
        .with_status(200)
        .with_body(
            json!({
                "files": [
                    {"id": "v1", "name": "a.mp4", "mimeType": "video/mp4"},
                    {"id": "v2", "name": "b.mkv", "mimeType": "video/x-matroska"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DriveClient::with_base_url(static_auth(), server.url());
    let videos = client.list_videos("folder1").await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].name, "a.mp4");
    assert_eq!(videos[1].id, "v2");
    mock.assert_async().await;
}

#[tokio::test]
async fn download_streams_bytes_to_disk() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/v1")
        .match_query(Matcher::UrlEncoded("alt".into(), "media".into()))
        .with_status(200)
        .with_body("fake video bytes")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.mp4");

    let metadata: FileMetadata = serde_json::from_value(json!({
        "id": "v1",
        "name": "a.mp4",
        "mimeType": "video/mp4"
    }))
    .unwrap();

    let client = DriveClient::with_base_url(static_auth(), server.url());
    client.download(&metadata, &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"fake video bytes");
}

#[tokio::test]
async fn download_maps_remote_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/v1")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({"error": {"code": 404, "message": "gone"}}).to_string())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.mp4");

    let metadata: FileMetadata = serde_json::from_value(json!({
        "id": "v1",
        "name": "a.mp4",
        "mimeType": "video/mp4"
    }))
    .unwrap();

    let client = DriveClient::with_base_url(static_auth(), server.url());
    let err = client.download(&metadata, &dest).await.unwrap_err();

    assert!(matches!(err, ScribeError::NotFound(_)));
    assert!(!dest.exists());
}
