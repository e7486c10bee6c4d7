//! Drive backend errors.

/// Errors that can occur talking to Drive.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Drive access token not configured (set {env})")]
    MissingToken { env: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Drive API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected Drive response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DriveError {
    /// True for 401/403 responses, i.e. the token is missing scope or expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DriveError::ApiError { status: 401 | 403, .. })
    }
}
