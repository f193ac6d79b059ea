use reqwest::StatusCode;

/// Failure of a backend call.
///
/// [`ApiError::Aborted`] is kept apart from real failures so callers can say
/// "cancelled" instead of "error".
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request aborted")]
    Aborted,

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Plain-text description suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Aborted => "Generation cancelled.".to_string(),
            Self::Transport(e) if e.is_connect() => "Could not reach the server.".to_string(),
            Self::Transport(e) if e.is_timeout() => "The server took too long to respond.".to_string(),
            Self::Transport(_) => "The request to the server failed.".to_string(),
            Self::Status { detail, .. } => detail.clone(),
            Self::Decode(_) => "The server returned a response that could not be read.".to_string(),
            Self::Io(e) => format!("Could not read the file: {e}"),
        }
    }
}
