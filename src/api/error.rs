use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider rejected the request (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("{path} not found")]
    NotFound { path: String },
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request did not finish: {0}")]
    Aborted(String),
}

impl ApiError {
    /// Maps a non-success status onto the error taxonomy.
    pub fn from_status(status: u16, path: &str) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized { status },
            404 => ApiError::NotFound { path: path.to_string() },
            _ => ApiError::Status { status, path: path.to_string() },
        }
    }
}
