use crate::config::ApiConfig;
use crate::error::{DeleteError, UploadError};
use crate::models::{CandidateFile, UploadResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const APP_USER_AGENT: &str = concat!("chalet-media/", env!("CARGO_PKG_VERSION"));

/// The remote image API: one multipart upload call per attempt and a
/// delete keyed by storage key.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, files: &[CandidateFile]) -> Result<UploadResponse, UploadError>;

    async fn delete(&self, key: &str) -> Result<(), DeleteError>;
}

#[derive(Debug, Clone)]
pub struct HttpImageStore {
    client: Client,
    upload_url: Url,
    delete_base: Url,
    field_name: String,
    timeout: Duration,
}

impl HttpImageStore {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(api.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            upload_url: endpoint(&api.base_url, &api.upload_path)?,
            delete_base: endpoint(&api.base_url, &api.delete_path)?,
            field_name: api.field_name.clone(),
            timeout: api.timeout(),
        })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// URL of the delete call; the key becomes a single percent-encoded
    /// path segment.
    pub fn delete_url(&self, key: &str) -> Result<Url, DeleteError> {
        let mut url = self.delete_base.clone();
        url.path_segments_mut()
            .map_err(|_| DeleteError::Network(format!("Cannot build delete URL from {}", self.delete_base)))?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    fn build_form(&self, files: &[CandidateFile]) -> Result<Form, UploadError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::stream_with_length(file.data.clone(), file.size())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)
                .map_err(|e| UploadError::Rejected(format!("{}: {}", file.name, e)))?;
            form = form.part(self.field_name.clone(), part);
        }
        Ok(form)
    }

    fn classify(&self, err: reqwest::Error) -> UploadError {
        if err.is_timeout() {
            UploadError::Timeout(self.timeout.as_secs())
        } else {
            UploadError::Network(err.to_string())
        }
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).with_context(|| format!("Invalid API endpoint '{}'", joined))
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, files: &[CandidateFile]) -> Result<UploadResponse, UploadError> {
        let form = self.build_form(files)?;
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(self.upload_url.clone())
            .header("X-Requested-With", "XMLHttpRequest")
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        tracing::debug!(
            "Upload request completed in {}ms, status: {}",
            started.elapsed().as_millis(),
            status.as_u16()
        );

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        if !body.success && body.data.images.is_empty() {
            return Err(UploadError::Rejected(
                "Server reported the upload as unsuccessful".to_string(),
            ));
        }

        Ok(body)
    }

    async fn delete(&self, key: &str) -> Result<(), DeleteError> {
        let url = self.delete_url(key)?;
        let response = self.client.delete(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeleteError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
