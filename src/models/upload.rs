use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-selected file waiting to be validated and uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Progress snapshot of the one batch in flight.
///
/// `percentage` is synthetic: it creeps up on a timer while the request is
/// outstanding and only reaches 100 once the server has answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadBatch {
    pub id: Uuid,
    pub total: usize,
    pub uploaded: usize,
    pub current_file: Option<String>,
    pub percentage: u8,
    pub total_bytes: u64,
    pub transferred_bytes: u64,
}

impl UploadBatch {
    pub fn start(files: &[CandidateFile]) -> Self {
        Self {
            id: Uuid::new_v4(),
            total: files.len(),
            uploaded: 0,
            current_file: files.first().map(|f| f.name.clone()),
            percentage: 0,
            total_bytes: files.iter().map(CandidateFile::size).sum(),
            transferred_bytes: 0,
        }
    }

    pub fn complete(&mut self) {
        self.uploaded = self.total;
        self.percentage = 100;
        self.transferred_bytes = self.total_bytes;
    }
}

/// A file that could not be uploaded once retries ran out or the server
/// refused it outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub file: CandidateFile,
    pub error: String,
    pub retry_count: u32,
    pub failed_at: DateTime<Utc>,
}

impl FailedUpload {
    pub fn new(file: CandidateFile, error: impl Into<String>, retry_count: u32) -> Self {
        Self {
            file,
            error: error.into(),
            retry_count,
            failed_at: Utc::now(),
        }
    }

    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Success,
    Failed,
}

impl std::fmt::Display for UploadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Uploading => write!(f, "uploading"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
}

impl NetworkStatus {
    pub fn online() -> Self {
        Self {
            online: true,
            connection_type: None,
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            connection_type: None,
        }
    }
}

/// Body of a successful upload response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: UploadResponseData,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponseData {
    #[serde(default)]
    pub images: Vec<StoredImage>,
    #[serde(default)]
    pub failed: Vec<RejectedFile>,
    #[serde(default)]
    pub stats: Option<UploadStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub key: String,
    pub public_url: String,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedFile {
    pub original_name: String,
    #[serde(default)]
    pub error: String,
}

/// Informational compression figures. Servers report these as numbers or as
/// preformatted strings, so they are kept as raw JSON and never fail a batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStats {
    #[serde(default)]
    pub space_saved: Option<serde_json::Value>,
    #[serde(default)]
    pub original_size: Option<serde_json::Value>,
    #[serde(default)]
    pub compressed_size: Option<serde_json::Value>,
}

impl UploadStats {
    /// `spaceSaved` ready for display: strings verbatim, byte counts
    /// through `format`.
    pub fn space_saved_with(&self, format: impl Fn(u64) -> String) -> Option<String> {
        match self.space_saved.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(match n.as_u64() {
                Some(bytes) => format(bytes),
                None => n.to_string(),
            }),
            other => Some(other.to_string()),
        }
    }
}
