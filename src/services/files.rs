use crate::models::CandidateFile;
use anyhow::{Context, Result};
use std::path::Path;

/// Sniff the MIME type from the content, falling back to the extension.
pub fn detect_mime_type(path: &Path, data: &[u8]) -> String {
    match infer::get(data) {
        Some(kind) => kind.mime_type().to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

pub fn load_candidate(path: &Path) -> Result<CandidateFile> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let mime_type = detect_mime_type(path, &data);
    Ok(CandidateFile::new(name, mime_type, data))
}

pub fn load_candidates(paths: &[impl AsRef<Path>]) -> Result<Vec<CandidateFile>> {
    paths.iter().map(|p| load_candidate(p.as_ref())).collect()
}
