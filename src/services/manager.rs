use crate::config::Config;
use crate::error::{DeleteError, UploadError};
use crate::models::{
    CandidateFile, FailedUpload, ImageRecord, NetworkStatus, Notice, UploadBatch, UploadResponse,
    UploadState,
};
use crate::services::connectivity::Connectivity;
use crate::services::deletion;
use crate::services::executor::{RetryPolicy, UploadExecutor};
use crate::services::label::{LabelEditOutcome, LabelEditor, DEFAULT_MAX_LABEL_LENGTH};
use crate::services::ordering::{self, DragSensor, Key, Rect, ReorderIntent, SensorEvent};
use crate::services::progress::ProgressTracker;
use crate::services::store::ImageStore;
use crate::services::validator::{self, UploadRules};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Receives the whole replacement collection after every mutation.
pub type ChangeCallback = Box<dyn FnMut(Vec<ImageRecord>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoFiles,
    Disabled,
    Busy,
    Offline,
    LimitReached,
    NothingToRetry,
    RetriesExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded {
        added: usize,
        skipped: usize,
        failed: usize,
    },
    Invalid {
        errors: Vec<String>,
    },
    Failed {
        error: UploadError,
        files: usize,
    },
    Ignored(IgnoreReason),
}

/// The image step of the chalet form: uploads, ordering, deletion and
/// caption editing over one collection.
pub struct MediaManager {
    images: Vec<ImageRecord>,
    on_change: ChangeCallback,
    store: Arc<dyn ImageStore>,
    rules: UploadRules,
    policy: RetryPolicy,
    connectivity: Connectivity,
    progress: ProgressTracker,
    disabled: bool,
    state: UploadState,
    failed: Vec<FailedUpload>,
    validation_errors: Vec<String>,
    notices: Vec<Notice>,
    label_editor: Option<LabelEditor>,
    label_max_length: usize,
}

impl std::fmt::Debug for MediaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaManager")
            .field("images", &self.images.len())
            .field("state", &self.state)
            .field("disabled", &self.disabled)
            .field("failed", &self.failed.len())
            .finish_non_exhaustive()
    }
}

impl MediaManager {
    pub fn new(
        images: Vec<ImageRecord>,
        store: Arc<dyn ImageStore>,
        on_change: impl FnMut(Vec<ImageRecord>) + Send + 'static,
    ) -> Self {
        Self {
            images,
            on_change: Box::new(on_change),
            store,
            rules: UploadRules::default(),
            policy: RetryPolicy::default(),
            connectivity: Connectivity::default(),
            progress: ProgressTracker::default(),
            disabled: false,
            state: UploadState::Idle,
            failed: Vec::new(),
            validation_errors: Vec::new(),
            notices: Vec::new(),
            label_editor: None,
            label_max_length: DEFAULT_MAX_LABEL_LENGTH,
        }
    }

    pub fn from_config(
        config: &Config,
        images: Vec<ImageRecord>,
        store: Arc<dyn ImageStore>,
        on_change: impl FnMut(Vec<ImageRecord>) + Send + 'static,
    ) -> Result<Self> {
        Ok(Self::new(images, store, on_change)
            .with_rules(UploadRules::from_config(&config.upload)?)
            .with_retry_policy(RetryPolicy::from_config(&config.retry))
            .with_progress(ProgressTracker::new(&config.progress))
            .with_label_max_length(config.labels.max_length))
    }

    pub fn with_rules(mut self, rules: UploadRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.rules.max_images = max_images;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_label_max_length(mut self, max_length: usize) -> Self {
        self.label_max_length = max_length;
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.label_editor = None;
        }
    }

    /// Take a collection the caller changed on its own.
    pub fn set_images(&mut self, images: Vec<ImageRecord>) {
        self.images = images;
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn is_uploading(&self) -> bool {
        self.state == UploadState::Uploading
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn failed_uploads(&self) -> &[FailedUpload] {
        &self.failed
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn network_status(&self) -> NetworkStatus {
        self.connectivity.status()
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn progress(&self) -> watch::Receiver<Option<UploadBatch>> {
        self.progress.subscribe()
    }

    pub fn remaining_slots(&self) -> usize {
        self.rules.remaining_slots(&self.images)
    }

    pub fn can_upload(&self) -> bool {
        !self.disabled
            && !self.is_uploading()
            && self.connectivity.is_online()
            && self.remaining_slots() > 0
    }

    /// Validate and upload a fresh selection. Any earlier failures are
    /// discarded and every file starts with a zero retry counter.
    pub async fn upload(&mut self, files: Vec<CandidateFile>) -> UploadOutcome {
        if files.is_empty() {
            return UploadOutcome::Ignored(IgnoreReason::NoFiles);
        }
        if self.disabled {
            return UploadOutcome::Ignored(IgnoreReason::Disabled);
        }
        if self.is_uploading() {
            return UploadOutcome::Ignored(IgnoreReason::Busy);
        }

        self.validation_errors.clear();
        self.failed.clear();

        if !self.connectivity.is_online() {
            self.notify_offline();
            return UploadOutcome::Ignored(IgnoreReason::Offline);
        }

        let remaining = self.remaining_slots();
        if remaining == 0 {
            self.notices.push(Notice::error(
                "Maximum image limit reached",
                format!(
                    "You can upload a maximum of {} images.",
                    self.rules.max_images
                ),
            ));
            return UploadOutcome::Ignored(IgnoreReason::LimitReached);
        }

        let report = validator::validate_files(files, &self.rules);
        if !report.is_clean() {
            self.notices.push(Notice::error(
                "File validation failed",
                format!(
                    "{} file(s) failed validation. Check the errors below.",
                    report.errors.len()
                ),
            ));
            self.validation_errors = report.errors.clone();
            return UploadOutcome::Invalid {
                errors: report.errors,
            };
        }

        let selection = validator::select_for_upload(report.valid, remaining);
        if selection.skipped > 0 {
            self.notices.push(Notice::info(
                "Some files skipped",
                format!(
                    "Only {} files uploaded due to image limit; {} skipped.",
                    selection.accepted.len(),
                    selection.skipped
                ),
            ));
        }

        self.run_batch(selection.accepted, 0, selection.skipped).await
    }

    /// Resubmit the failed files that still have retries left.
    ///
    /// A manual retry consumes one unit of the same per-file counter the
    /// automatic retries use, so the cap covers both paths.
    pub async fn retry_failed(&mut self) -> UploadOutcome {
        if self.disabled {
            return UploadOutcome::Ignored(IgnoreReason::Disabled);
        }
        if self.is_uploading() {
            return UploadOutcome::Ignored(IgnoreReason::Busy);
        }
        if self.failed.is_empty() {
            return UploadOutcome::Ignored(IgnoreReason::NothingToRetry);
        }

        let max_retries = self.policy.max_retries;
        if !self.failed.iter().any(|f| f.can_retry(max_retries)) {
            self.notices.push(Notice::error(
                "Maximum retry attempts reached",
                "Unable to upload some files after multiple attempts.",
            ));
            return UploadOutcome::Ignored(IgnoreReason::RetriesExhausted);
        }

        if !self.connectivity.is_online() {
            self.notify_offline();
            return UploadOutcome::Ignored(IgnoreReason::Offline);
        }

        let remaining = self.remaining_slots();
        if remaining == 0 {
            self.notices.push(Notice::error(
                "Maximum image limit reached",
                format!(
                    "You can upload a maximum of {} images.",
                    self.rules.max_images
                ),
            ));
            return UploadOutcome::Ignored(IgnoreReason::LimitReached);
        }

        let (mut retryable, exhausted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.failed)
            .into_iter()
            .partition(|f| f.can_retry(max_retries));
        self.failed = exhausted;

        let overflow = retryable.split_off(remaining.min(retryable.len()));
        let counter = retryable
            .iter()
            .map(|f| f.retry_count)
            .max()
            .unwrap_or(0)
            + 1;
        let skipped = overflow.len();
        if skipped > 0 {
            self.notices.push(Notice::info(
                "Some files skipped",
                format!(
                    "Only {} files retried due to image limit; {} skipped.",
                    retryable.len(),
                    skipped
                ),
            ));
            // Still listed so they can be retried or dismissed later.
            self.failed.extend(overflow);
        }
        let files: Vec<CandidateFile> = retryable.into_iter().map(|f| f.file).collect();

        tracing::info!(
            "Retrying {} failed upload(s), retry {}/{}",
            files.len(),
            counter,
            max_retries
        );

        self.run_batch(files, counter, skipped).await
    }

    /// Forget the failed files and return to idle.
    pub fn dismiss_failed(&mut self) {
        self.failed.clear();
        if self.state == UploadState::Failed {
            self.state = UploadState::Idle;
        }
    }

    async fn run_batch(
        &mut self,
        files: Vec<CandidateFile>,
        retries_used: u32,
        skipped: usize,
    ) -> UploadOutcome {
        self.state = UploadState::Uploading;
        let batch = self.progress.begin(&files);
        tracing::info!(
            batch = %batch.id,
            "Starting upload of {} file(s), {}",
            batch.total,
            validator::format_file_size(batch.total_bytes)
        );

        let executor = UploadExecutor::new(
            self.store.clone(),
            self.policy,
            self.connectivity.clone(),
        );
        let result = executor.execute(&files, retries_used).await;

        let outcome = match result {
            Ok(success) => {
                self.progress.finish();
                tracing::info!(
                    batch = %batch.id,
                    "Upload completed after {} attempt(s)",
                    success.attempts
                );
                self.accept_response(files, success.response, success.retries_used, skipped)
            }
            Err(failure) => {
                let (title, description) = failure.error.notice_text();
                tracing::warn!(
                    batch = %batch.id,
                    "Upload failed after {} attempt(s): {}",
                    failure.attempts,
                    failure.error
                );
                self.notices.push(Notice::error(title, description));

                let count = files.len();
                let message = failure.error.to_string();
                self.failed.extend(
                    files
                        .into_iter()
                        .map(|file| FailedUpload::new(file, message.clone(), failure.retries_used)),
                );
                self.state = UploadState::Failed;
                UploadOutcome::Failed {
                    error: failure.error,
                    files: count,
                }
            }
        };

        self.progress.clear();
        outcome
    }

    fn accept_response(
        &mut self,
        files: Vec<CandidateFile>,
        response: UploadResponse,
        retries_used: u32,
        skipped: usize,
    ) -> UploadOutcome {
        let data = response.data;

        // Files the server turned away are matched by name, first match wins.
        let mut stored_files = files;
        let mut rejected: Vec<(CandidateFile, String)> = Vec::new();
        for failure in &data.failed {
            if let Some(pos) = stored_files
                .iter()
                .position(|f| f.name == failure.original_name)
            {
                let error = if failure.error.is_empty() {
                    "Rejected by server".to_string()
                } else {
                    failure.error.clone()
                };
                rejected.push((stored_files.remove(pos), error));
            }
        }

        let base = self.images.len();
        let new_images: Vec<ImageRecord> = data
            .images
            .iter()
            .enumerate()
            .map(|(idx, stored)| {
                let alt = stored
                    .original_name
                    .clone()
                    .or_else(|| stored_files.get(idx).map(|f| f.name.clone()))
                    .unwrap_or_else(|| format!("Image {}", base + idx + 1));
                ImageRecord::from_upload(&stored.key, &stored.public_url, &alt, base + idx + 1)
            })
            .collect();

        if stored_files.len() > new_images.len() {
            for file in stored_files.drain(new_images.len()..) {
                rejected.push((file, "Server did not acknowledge this file".to_string()));
            }
        }

        let added = new_images.len();
        if added > 0 {
            let updated = ordering::insert(&self.images, new_images);
            self.commit(updated);

            let space_saved = data
                .stats
                .as_ref()
                .and_then(|s| s.space_saved_with(validator::format_file_size))
                .map(|saved| format!(" Space saved: {}", saved))
                .unwrap_or_default();
            self.notices.push(Notice::info(
                "Images uploaded successfully",
                format!("{} image(s) uploaded.{}", added, space_saved),
            ));
        }

        let failed = rejected.len();
        if failed > 0 {
            tracing::warn!("{} file(s) rejected by the server", failed);
            self.notices.push(Notice::error(
                "Some images were not uploaded",
                format!("{} file(s) could not be stored. You can retry them.", failed),
            ));
            self.failed.extend(
                rejected
                    .into_iter()
                    .map(|(file, error)| FailedUpload::new(file, error, retries_used)),
            );
        }
        // Files left at the retry cap by an earlier round keep the batch failed.
        self.state = if self.failed.is_empty() {
            UploadState::Success
        } else {
            UploadState::Failed
        };

        UploadOutcome::Uploaded {
            added,
            skipped,
            failed,
        }
    }

    /// Delete the record at `index` on the server, then locally.
    pub async fn remove(&mut self, index: usize) -> Result<(), DeleteError> {
        if self.disabled {
            return Err(DeleteError::Disabled);
        }

        match deletion::delete_image(self.store.as_ref(), &self.images, index).await {
            Ok(updated) => {
                self.commit(updated);
                self.notices.push(Notice::info(
                    "Image removed",
                    "The image has been successfully removed.",
                ));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Image deletion error: {}", e);
                self.notices.push(Notice::error(
                    "Deletion failed",
                    "Could not remove the image. Please try again.",
                ));
                Err(e)
            }
        }
    }

    /// Move a record. Returns whether the collection changed.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.apply_intent(ReorderIntent::new(from, to))
    }

    pub fn apply_intent(&mut self, intent: ReorderIntent) -> bool {
        if self.disabled {
            return false;
        }
        match intent.apply(&self.images) {
            Some(updated) => {
                tracing::debug!("Moved image {} -> {}", intent.source, intent.destination);
                self.commit(updated);
                true
            }
            None => false,
        }
    }

    /// Feed an input event through any drag sensor.
    pub fn handle_drag_event(
        &mut self,
        sensor: &mut dyn DragSensor,
        event: &SensorEvent,
        layout: &[Rect],
    ) -> bool {
        if self.disabled {
            return false;
        }
        match sensor.handle(event, layout) {
            Some(intent) => self.apply_intent(intent),
            None => false,
        }
    }

    pub fn begin_label_edit(&mut self, index: usize) -> bool {
        if self.disabled {
            return false;
        }
        self.label_editor = LabelEditor::open(&self.images, index, self.label_max_length);
        self.label_editor.is_some()
    }

    pub fn label_editor(&self) -> Option<&LabelEditor> {
        self.label_editor.as_ref()
    }

    pub fn set_label_draft(&mut self, text: &str) {
        if let Some(editor) = self.label_editor.as_mut() {
            editor.set_draft(text);
        }
    }

    /// Commit the open label edit. Returns whether a label was written.
    pub fn confirm_label(&mut self) -> bool {
        let Some(editor) = self.label_editor.as_ref() else {
            return false;
        };
        match editor.commit(&self.images) {
            Some(updated) => {
                self.label_editor = None;
                self.commit(updated);
                true
            }
            None => false,
        }
    }

    pub fn cancel_label(&mut self) {
        self.label_editor = None;
    }

    pub fn label_key(&mut self, key: Key) -> bool {
        let Some(editor) = self.label_editor.as_ref() else {
            return false;
        };
        match editor.handle_key(key, &self.images) {
            LabelEditOutcome::Committed(updated) => {
                self.label_editor = None;
                self.commit(updated);
                true
            }
            LabelEditOutcome::Cancelled => {
                self.label_editor = None;
                false
            }
            LabelEditOutcome::Pending => false,
        }
    }

    fn notify_offline(&mut self) {
        let (title, description) = UploadError::Offline.notice_text();
        self.notices.push(Notice::error(title, description));
    }

    fn commit(&mut self, updated: Vec<ImageRecord>) {
        self.images = updated.clone();
        (self.on_change)(updated);
    }
}
