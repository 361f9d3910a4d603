//! Google Drive API client for metadata, listing and download operations.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::auth::Authenticator;
use crate::error::{Result, ScribeError};
use crate::models::{ApiErrorResponse, FileListResponse, FileMetadata};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for file metadata.
const METADATA_FIELDS: &str = "id, name, mimeType, size, modifiedTime, owners(displayName)";

/// Narrow capability interface over the storage backend.
///
/// The orchestrator is generic over this trait so its control flow can be
/// exercised without network access.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Fetch metadata for a single file.
    async fn get_metadata(&self, file_id: &str) -> Result<FileMetadata>;

    /// List the video files directly inside a folder.
    async fn list_videos(&self, folder_id: &str) -> Result<Vec<FileMetadata>>;

    /// Stream a file's bytes to a local path.
    async fn download(&self, file: &FileMetadata, dest: &Path) -> Result<()>;
}

/// Client for the Google Drive v3 REST API.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, DRIVE_API_BASE.to_string())
    }

    /// Create a client against a non-default API base URL (used by tests).
    pub fn with_base_url(auth: Authenticator, base_url: String) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url,
        }
    }

    /// Map a non-success API response onto the error taxonomy.
    fn api_error(status: u16, body: String, subject: &str) -> ScribeError {
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status {
            404 => ScribeError::NotFound(format!("{}: {}", subject, message)),
            401 | 403 => ScribeError::PermissionDenied(format!("{}: {}", subject, message)),
            _ => ScribeError::Api { status, message },
        }
    }
}

#[async_trait]
impl MediaProvider for DriveClient {
    async fn get_metadata(&self, file_id: &str) -> Result<FileMetadata> {
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .get(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(&token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("fields", METADATA_FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::api_error(status.as_u16(), body, file_id));
        }

        let metadata: FileMetadata = response.json().await?;
        Ok(metadata)
    }

    async fn list_videos(&self, folder_id: &str) -> Result<Vec<FileMetadata>> {
        let token = self.auth.access_token().await?;
        let query = format!(
            "'{}' in parents and trashed = false and mimeType contains 'video/'",
            folder_id
        );

        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.base_url))
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("spaces", "drive"),
                    (
                        "fields",
                        "nextPageToken, files(id, name, size, mimeType, modifiedTime, owners(displayName))",
                    ),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Self::api_error(status.as_u16(), body, folder_id));
            }

            let list_response: FileListResponse = response.json().await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }

    async fn download(&self, file: &FileMetadata, dest: &Path) -> Result<()> {
        let token = self.auth.access_token().await?;

        if !file.is_video() {
            tracing::warn!(
                name = %file.name,
                mime = file.mime_type.as_deref().unwrap_or("unknown"),
                "file mimeType does not look like a video"
            );
        }

        let response = self
            .http
            .get(format!("{}/files/{}", self.base_url, file.id))
            .bearer_auth(&token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::api_error(status.as_u16(), body, &file.name));
        }

        let total = response.content_length().or(file.size).unwrap_or(0);
        let progress = ProgressBar::new(total);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap(),
        );
        progress.set_message(file.name.clone());

        // Stream to file
        let mut out = File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            progress.inc(chunk.len() as u64);
        }

        out.flush().await?;
        progress.finish_and_clear();

        Ok(())
    }
}
