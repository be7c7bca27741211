use thiserror::Error;

/// Why one upload attempt (or the whole batch) did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No internet connection")]
    Offline,

    #[error("Upload timeout after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),
}

impl UploadError {
    /// Timeouts, connection failures and 5xx responses are worth another
    /// attempt. Everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Http { status, .. } => (500..600).contains(status),
            Self::Offline | Self::InvalidResponse(_) | Self::Rejected(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Title and description of the notice raised for this failure.
    pub fn notice_text(&self) -> (&'static str, String) {
        match self {
            Self::Offline => (
                "No internet connection",
                "Please check your connection and try again.".to_string(),
            ),
            Self::Timeout(_) => (
                "Upload timeout",
                "The upload timed out. This may happen with large files or slow connections. \
                 Please try again with smaller files or check your internet connection."
                    .to_string(),
            ),
            Self::Http { status: 413, .. } => (
                "File too large",
                "One or more files exceed the server upload limit. Please try with smaller files."
                    .to_string(),
            ),
            Self::Http { status: 415, .. } => (
                "Unsupported file type",
                "One or more files have an unsupported format. Please use JPEG, PNG, WebP, or GIF files."
                    .to_string(),
            ),
            Self::Http { status, .. } if *status >= 500 => (
                "Server error",
                "There was a server error. Please try again in a few moments.".to_string(),
            ),
            Self::Network(_) => (
                "Network error",
                "Network connection failed. Please check your internet connection and try again."
                    .to_string(),
            ),
            other => ("Upload failed", other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    #[error("No image at position {0}")]
    IndexOutOfRange(usize),

    #[error("Image at position {0} has no storage key")]
    NotSynced(usize),

    #[error("Failed to delete image from server: HTTP {status}")]
    Http { status: u16, message: String },

    #[error("Failed to delete image from server: {0}")]
    Network(String),

    #[error("Image management is disabled")]
    Disabled,
}

impl From<reqwest::Error> for DeleteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
