use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A user-facing message raised at an operation boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.into(),
            at: Utc::now(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
            at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
