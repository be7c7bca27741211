use super::{open_manager, print_notices};
use crate::services::{files, UploadOutcome};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub async fn run(
    config_path: &Path,
    manifest_path: &Path,
    paths: Vec<PathBuf>,
    retry: bool,
) -> Result<()> {
    let candidates = files::load_candidates(&paths)?;
    let (mut manager, writer) = open_manager(config_path, manifest_path)?;

    let mut progress = manager.progress();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let snapshot = progress.borrow_and_update().clone();
            if let Some(batch) = snapshot {
                tracing::info!(
                    "Uploading {} file(s): {}%",
                    batch.total,
                    batch.percentage
                );
            }
        }
    });

    let mut outcome = manager.upload(candidates).await;
    print_notices(manager.take_notices());

    if retry {
        while !manager.failed_uploads().is_empty() {
            let next = manager.retry_failed().await;
            print_notices(manager.take_notices());
            if matches!(next, UploadOutcome::Ignored(_)) {
                break;
            }
            outcome = next;
        }
    }

    reporter.abort();

    for error in manager.validation_errors() {
        eprintln!("  {}", error);
    }
    for failed in manager.failed_uploads() {
        eprintln!(
            "  {}: {} (retries used: {})",
            failed.file.name, failed.error, failed.retry_count
        );
    }

    writer.finish()?;

    match outcome {
        UploadOutcome::Uploaded { failed: 0, .. } => Ok(()),
        UploadOutcome::Uploaded { failed, .. } => {
            anyhow::bail!("{} file(s) failed to upload", failed)
        }
        UploadOutcome::Invalid { errors } => {
            anyhow::bail!("{} file(s) failed validation", errors.len())
        }
        UploadOutcome::Failed { error, files } => {
            anyhow::bail!("Upload of {} file(s) failed: {}", files, error)
        }
        UploadOutcome::Ignored(reason) => anyhow::bail!("Upload not started: {:?}", reason),
    }
}
