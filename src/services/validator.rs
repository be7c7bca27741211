use crate::config::UploadConfig;
use crate::models::{CandidateFile, ImageRecord};
use anyhow::Result;

const MB: u64 = 1024 * 1024;

/// Limits a batch of candidate files is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRules {
    pub max_images: usize,
    pub max_file_size: u64,
    pub max_total_size: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadRules {
    fn default() -> Self {
        Self {
            max_images: 15,
            max_file_size: 25 * MB,
            max_total_size: 250 * MB,
            allowed_types: ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UploadRules {
    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        Ok(Self {
            max_images: config.max_images,
            max_file_size: config.max_file_size_bytes()?,
            max_total_size: config.max_total_size_bytes()?,
            allowed_types: config.allowed_types.clone(),
        })
    }

    pub fn remaining_slots(&self, held: &[ImageRecord]) -> usize {
        self.max_images.saturating_sub(held.len())
    }

    pub fn is_allowed_type(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub valid: Vec<CandidateFile>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Files admitted to a batch after applying the remaining-slot ceiling.
#[derive(Debug, Clone, Default)]
pub struct SlotSelection {
    pub accepted: Vec<CandidateFile>,
    pub skipped: usize,
}

/// Check one file, returning the reason it is refused.
pub fn validate_file(file: &CandidateFile, rules: &UploadRules) -> Option<String> {
    if !rules.is_allowed_type(&file.mime_type) {
        return Some(format!(
            "File type {} is not allowed. Allowed types: {}",
            file.mime_type,
            rules.allowed_types.join(", ")
        ));
    }
    if file.size() > rules.max_file_size {
        return Some(format!(
            "File size exceeds maximum limit of {}",
            format_file_size(rules.max_file_size)
        ));
    }
    if file.size() == 0 {
        return Some("File appears to be empty".to_string());
    }
    None
}

pub fn total_size(files: &[CandidateFile]) -> u64 {
    files.iter().map(CandidateFile::size).sum()
}

/// Partition candidates into valid files and error messages.
///
/// The aggregate limit is checked first; exceeding it rejects the whole set
/// without reporting per-file problems.
pub fn validate_files(files: Vec<CandidateFile>, rules: &UploadRules) -> ValidationReport {
    let mut report = ValidationReport::default();

    let total = total_size(&files);
    if total > rules.max_total_size {
        tracing::debug!(
            "Rejecting {} file(s): {} exceeds aggregate limit",
            files.len(),
            format_file_size(total)
        );
        report.errors.push(format!(
            "Total upload size exceeds {} limit",
            format_file_size(rules.max_total_size).replace(' ', "")
        ));
        return report;
    }

    for file in files {
        match validate_file(&file, rules) {
            Some(reason) => {
                tracing::debug!("Rejected {}: {}", file.name, reason);
                report.errors.push(format!("{}: {}", file.name, reason));
            }
            None => report.valid.push(file),
        }
    }

    report
}

/// Keep the first `remaining` files in submission order.
pub fn select_for_upload(mut valid: Vec<CandidateFile>, remaining: usize) -> SlotSelection {
    let skipped = valid.len().saturating_sub(remaining);
    valid.truncate(remaining);
    SlotSelection {
        accepted: valid,
        skipped,
    }
}

/// The form step needs at least one image before it can be submitted.
pub fn validate_collection(images: &[ImageRecord]) -> Result<()> {
    if images.is_empty() {
        anyhow::bail!("At least one image is required");
    }
    let mains = images.iter().filter(|img| img.is_main).count();
    if mains != 1 || !images[0].is_main {
        anyhow::bail!("The first image must be the only main image");
    }
    Ok(())
}

/// Render a byte count the way upload messages show it: `0 Bytes`,
/// `1.5 KB`, `25 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
