use thiserror::Error;

/// Everything that can go wrong between pressing "classify" and showing a label.
///
/// The enum is `Clone` so a failure can be carried inside a
/// [`DisplayState`](crate::DisplayState) and rendered more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The request was superseded by a newer one. Never shown to the user.
    #[error("request was superseded")]
    Aborted,

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("could not reach the classifier")]
    Transport(String),

    /// The detail is kept for logs only; the rendered message stays fixed.
    #[error("malformed response from classifier")]
    MalformedResponse { detail: String },

    #[error("failed to read input: {0}")]
    Input(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ClassifyError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        ClassifyError::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// Internal detail worth logging alongside the user-facing message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClassifyError::Transport(detail)
            | ClassifyError::MalformedResponse { detail }
            | ClassifyError::Input(detail)
            | ClassifyError::Client(detail) => Some(detail),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ClassifyError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ClassifyError::Timeout
        } else if let Some(status) = value.status() {
            ClassifyError::Status(status.as_u16())
        } else {
            ClassifyError::Transport(value.to_string())
        }
    }
}

impl From<std::io::Error> for ClassifyError {
    fn from(value: std::io::Error) -> Self {
        ClassifyError::Input(value.to_string())
    }
}
