use crate::services::{files, manifest, validator};
use crate::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub async fn run(config_path: &Path, manifest_path: &Path, paths: Vec<PathBuf>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let rules = validator::UploadRules::from_config(&config.upload)?;
    let images = manifest::load(manifest_path)?;
    let candidates = files::load_candidates(&paths)?;

    let count = candidates.len();
    let total = validator::total_size(&candidates);
    let report = validator::validate_files(candidates, &rules);

    println!(
        "\n  {} file(s), {} total\n",
        count,
        validator::format_file_size(total)
    );

    for file in &report.valid {
        println!(
            "  \x1b[32m✓\x1b[0m {} ({}, {})",
            file.name,
            file.mime_type,
            validator::format_file_size(file.size())
        );
    }
    for error in &report.errors {
        println!("  \x1b[31m✗\x1b[0m {}", error);
    }

    if !report.is_clean() {
        anyhow::bail!("{} file(s) failed validation", report.errors.len());
    }

    let remaining = rules.remaining_slots(&images);
    let selection = validator::select_for_upload(report.valid, remaining);
    if selection.skipped > 0 {
        println!(
            "\n  \x1b[33m⚠\x1b[0m Only {} of {} file(s) fit; {} image slot(s) left",
            selection.accepted.len(),
            count,
            remaining
        );
    }
    println!();

    Ok(())
}
