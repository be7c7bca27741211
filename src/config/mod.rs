use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    #[serde(default = "default_delete_path")]
    pub delete_path: String,
    /// Multipart field every file part is sent under.
    #[serde(default = "default_field_name")]
    pub field_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            delete_path: default_delete_path(),
            field_name: default_field_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: String,
    #[serde(default = "default_max_total_size")]
    pub max_total_size: String,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_images: default_max_images(),
            max_file_size: default_max_file_size(),
            max_total_size: default_max_total_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> Result<u64> {
        parse_size(&self.max_file_size)
    }

    pub fn max_total_size_bytes(&self) -> Result<u64> {
        parse_size(&self.max_total_size)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; 3 means four attempts in total.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Highest synthetic percentage shown before the server answers.
    #[serde(default = "default_ceiling")]
    pub ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            ceiling: default_ceiling(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelConfig {
    #[serde(default = "default_label_max_length")]
    pub max_length: usize,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_length: default_label_max_length(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_upload_path() -> String {
    "/v1/images/upload".to_string()
}

fn default_delete_path() -> String {
    "/v1/images".to_string()
}

fn default_field_name() -> String {
    "images".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_images() -> usize {
    15
}

fn default_max_file_size() -> String {
    "25MB".to_string()
}

fn default_max_total_size() -> String {
    "250MB".to_string()
}

fn default_allowed_types() -> Vec<String> {
    ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

fn default_max_jitter_ms() -> u64 {
    1000
}

fn default_tick_ms() -> u64 {
    2000
}

fn default_ceiling() -> u8 {
    95
}

fn default_label_max_length() -> usize {
    50
}

/// Parse a human size such as `"25MB"`, `"512 KB"` or `"1048576"` into bytes.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        anyhow::bail!("Invalid size '{}': expected a number", input);
    }
    let value: u64 = number.parse()?;

    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        other => anyhow::bail!("Invalid size unit '{}' in '{}'", other, input),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size '{}' is too large", input))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run 'chalet-media init' to create one.",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file when it exists, fall back to defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.api.base_url).is_err() {
            anyhow::bail!("api.base_url '{}' is not a valid URL", self.api.base_url);
        }
        if self.api.field_name.is_empty() {
            anyhow::bail!("api.field_name must not be empty");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than 0");
        }
        if self.upload.max_images == 0 {
            anyhow::bail!("upload.max_images must be greater than 0");
        }
        if self.upload.allowed_types.is_empty() {
            anyhow::bail!("upload.allowed_types must list at least one MIME type");
        }
        let file_limit = self.upload.max_file_size_bytes()?;
        let total_limit = self.upload.max_total_size_bytes()?;
        if file_limit == 0 {
            anyhow::bail!("upload.max_file_size must be greater than 0");
        }
        if total_limit < file_limit {
            anyhow::bail!("upload.max_total_size must be at least upload.max_file_size");
        }
        if self.retry.max_retries > 10 {
            anyhow::bail!("retry.max_retries must be 10 or less");
        }
        if self.progress.ceiling >= 100 {
            anyhow::bail!("progress.ceiling must be below 100");
        }
        if self.labels.max_length == 0 {
            anyhow::bail!("labels.max_length must be greater than 0");
        }
        Ok(())
    }
}
