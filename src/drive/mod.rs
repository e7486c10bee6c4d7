//! Google Drive mirroring of captured frames.

pub mod auth;
pub mod backend;
pub mod client;
pub mod error;
pub mod folders;
pub mod uploader;

pub use auth::{TokenAuthenticator, DRIVE_TOKEN_ENV};
pub use backend::{Authenticator, DriveBackend, EntryKind, EntryQuery, RemoteEntry};
pub use client::DriveClient;
pub use error::DriveError;
pub use folders::{find_or_create, FolderResolver, ResolveError};
pub use uploader::{
    NoopObserver, UploadError, UploadItem, UploadObserver, UploadOutcome, UploadStatus, Uploader,
};
