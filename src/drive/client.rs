//! DriveClient - handles communication with the Google Drive v3 REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::backend::{DriveBackend, EntryQuery, RemoteEntry, FOLDER_MIME_TYPE};
use super::error::DriveError;

/// Default base URL for Drive metadata calls.
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Default base URL for Drive media uploads.
pub const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Default timeout for HTTP requests (60 seconds; uploads carry full screenshots).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Boundary for multipart/related upload bodies.
const MULTIPART_BOUNDARY: &str = "scrollshot-upload-boundary";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    trashed: bool,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the Drive endpoints scrollshot needs.
#[derive(Debug, Clone)]
pub struct DriveClient {
    token: String,
    api_base_url: String,
    upload_base_url: String,
    http_client: reqwest::Client,
}

impl DriveClient {
    /// Create a client against the public Drive endpoints.
    pub fn with_token(token: String) -> Result<Self, DriveError> {
        Self::with_base_urls(
            token,
            DRIVE_API_BASE_URL.to_string(),
            DRIVE_UPLOAD_BASE_URL.to_string(),
        )
    }

    /// Create a client with custom base URLs.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_urls(
        token: String,
        api_base_url: String,
        upload_base_url: String,
    ) -> Result<Self, DriveError> {
        if token.is_empty() {
            return Err(DriveError::MissingToken {
                env: "<explicit token>".to_string(),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Turn a non-2xx response into [`DriveError::ApiError`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, DriveError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        log::debug!("Drive API returned {}: {}", status, message);
        Err(DriveError::ApiError { status, message })
    }
}

/// Build a multipart/related body: JSON metadata part, then the media part.
fn multipart_body(metadata: &str, mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{b}\r\nContent-Type: {mime_type}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

#[async_trait]
impl DriveBackend for DriveClient {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<RemoteEntry>, DriveError> {
        let url = format!("{}/files", self.api_base_url);
        let q = query.to_drive_query();
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("q", q.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "100"),
            ])
            .send()
            .await?;

        let list: FileList = Self::check(response).await?.json().await?;
        Ok(list
            .files
            .into_iter()
            .map(|f| RemoteEntry {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<String, DriveError> {
        let url = format!("{}/files", self.api_base_url);
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: parent.into_iter().collect(),
        };
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()
            .await?;

        let created: CreatedFile = Self::check(response).await?.json().await?;
        log::info!("Created Drive folder '{}' ({})", name, created.id);
        Ok(created.id)
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, DriveError> {
        let url = format!("{}/files", self.upload_base_url);
        let metadata = serde_json::to_string(&FileMetadata {
            name,
            mime_type: None,
            parents: vec![parent],
        })
        .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(multipart_body(&metadata, mime_type, &bytes))
            .send()
            .await?;

        let created: CreatedFile = Self::check(response).await?.json().await?;
        if created.id.is_empty() {
            return Err(DriveError::InvalidResponse(format!(
                "upload of '{}' returned no file id",
                name
            )));
        }
        Ok(created.id)
    }

    async fn folder_exists(&self, id: &str) -> Result<bool, DriveError> {
        let url = format!("{}/files/{}", self.api_base_url, id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "id,name,trashed")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let entry: FileEntry = Self::check(response).await?.json().await?;
        Ok(!entry.trashed)
    }
}
