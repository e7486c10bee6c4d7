//! The remote storage surface used by folder resolution and the upload worker.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::error::DriveError;

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Any,
}

/// Filter for [`DriveBackend::list_entries`]. Trashed entries never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    /// Exact name; `None` lists everything under the parent.
    pub name: Option<String>,
    /// Parent folder id; `None` means the Drive root.
    pub parent: Option<String>,
    pub kind: EntryKind,
}

impl EntryQuery {
    pub fn folder(name: &str, parent: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            parent: parent.map(str::to_string),
            kind: EntryKind::Folder,
        }
    }

    pub fn file(name: &str, parent: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            parent: Some(parent.to_string()),
            kind: EntryKind::Any,
        }
    }

    /// All folders directly under `parent`.
    pub fn folders_in(parent: Option<&str>) -> Self {
        Self {
            name: None,
            parent: parent.map(str::to_string),
            kind: EntryKind::Folder,
        }
    }

    /// Render as a Drive v3 `q` expression.
    pub fn to_drive_query(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape_literal(name)));
        }
        if self.kind == EntryKind::Folder {
            clauses.push(format!("mimeType = '{}'", FOLDER_MIME_TYPE));
        }
        let parent = self.parent.as_deref().unwrap_or("root");
        clauses.push(format!("'{}' in parents", escape_literal(parent)));
        clauses.push("trashed = false".to_string());
        clauses.join(" and ")
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
}

/// An authorized handle on remote storage.
#[async_trait]
pub trait DriveBackend: Send + Sync {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<RemoteEntry>, DriveError>;

    /// Create a folder under `parent` (the Drive root when `None`) and return its id.
    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<String, DriveError>;

    /// Upload `bytes` as a new file in `parent` and return its id.
    async fn create_file(
        &self,
        name: &str,
        parent: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, DriveError>;

    /// Whether `id` names an existing, untrashed entry.
    async fn folder_exists(&self, id: &str) -> Result<bool, DriveError>;
}

/// Produces an authorized [`DriveBackend`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<Arc<dyn DriveBackend>, DriveError>;
}

/// MIME type for an upload, from its extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
