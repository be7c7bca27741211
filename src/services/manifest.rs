use crate::models::{ImageManifest, ImageRecord};
use anyhow::{Context, Result};
use std::path::Path;

/// Read the collection kept at `path`. A missing file is an empty collection.
pub fn load(path: &Path) -> Result<Vec<ImageRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: ImageManifest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid manifest {}", path.display()))?;
    Ok(manifest.images)
}

/// Replace the manifest with `images`, writing through a temp file so a
/// reader never sees half a collection.
pub fn save(path: &Path, images: &[ImageRecord]) -> Result<()> {
    let manifest = ImageManifest {
        images: images.to_vec(),
    };
    let json = serde_json::to_string_pretty(&manifest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to write manifest {}", path.display()))?;
    Ok(())
}
