use super::open_manager;
use crate::services::ordering::Key;
use crate::services::{manifest, validator};
use anyhow::Result;
use std::path::Path;

pub async fn list(manifest_path: &Path) -> Result<()> {
    let images = manifest::load(manifest_path)?;
    if images.is_empty() {
        println!("No images yet.");
        return Ok(());
    }

    let width = images.iter().map(|img| img.display_label().len()).max().unwrap_or(0);
    for (idx, img) in images.iter().enumerate() {
        println!(
            "{:>3} {} {:width$}  {}  {}",
            idx,
            if img.is_main { "★" } else { " " },
            img.display_label(),
            img.key.as_deref().unwrap_or("-"),
            img.url,
            width = width
        );
    }
    Ok(())
}

pub async fn reorder(config_path: &Path, manifest_path: &Path, from: usize, to: usize) -> Result<()> {
    let (mut manager, writer) = open_manager(config_path, manifest_path)?;
    if !manager.reorder(from, to) {
        anyhow::bail!(
            "Nothing to move: positions must differ and be below {}",
            manager.images().len()
        );
    }
    writer.finish()?;
    tracing::info!("Moved image {} to position {}", from, to);
    Ok(())
}

pub async fn label(config_path: &Path, manifest_path: &Path, index: usize, text: &str) -> Result<()> {
    let (mut manager, writer) = open_manager(config_path, manifest_path)?;
    if !manager.begin_label_edit(index) {
        anyhow::bail!("No image at position {}", index);
    }
    manager.set_label_draft(text);
    if !manager.label_key(Key::Enter) {
        anyhow::bail!("Label must not be empty");
    }
    writer.finish()?;
    let label = &manager.images()[index].label;
    tracing::info!("Image {} is now labelled '{}'", index, label);
    Ok(())
}

pub async fn verify(manifest_path: &Path) -> Result<()> {
    let images = manifest::load(manifest_path)?;
    validator::validate_collection(&images)?;
    println!("{} image(s), ready to submit", images.len());
    Ok(())
}
