pub mod check;
pub mod collection;
pub mod delete;
pub mod init;
pub mod upload;

use crate::models::{ImageRecord, Notice};
use crate::services::{manifest, HttpImageStore, MediaManager};
use crate::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "chalet-media")]
#[command(version)]
#[command(about = "Upload, order and manage chalet images", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "chalet-media.toml", env = "CHALET_MEDIA_CONFIG")]
    pub config: PathBuf,

    /// JSON file holding the image collection of the chalet being edited.
    #[arg(short, long, default_value = "images.json")]
    pub manifest: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Validate files without uploading them
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload images and append them to the collection
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keep retrying failed files until the retry cap is reached
        #[arg(long)]
        retry: bool,
    },
    /// Show the collection
    List,
    /// Move an image to another position (0-based)
    Move { from: usize, to: usize },
    /// Change the caption of an image
    Label { index: usize, text: String },
    /// Delete an image from the server and the collection
    Delete { index: usize },
    /// Check the collection is ready to be submitted
    Verify,
}

pub(crate) fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("\x1b[31m✗ {}\x1b[0m: {}", notice.title, notice.description);
        } else {
            println!("\x1b[32m✓ {}\x1b[0m: {}", notice.title, notice.description);
        }
    }
}

/// Writes every replacement collection to the manifest and keeps the first
/// failed write for the command to report.
#[derive(Clone)]
pub(crate) struct ManifestWriter {
    path: PathBuf,
    error: Arc<Mutex<Option<anyhow::Error>>>,
}

impl ManifestWriter {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            error: Arc::default(),
        }
    }

    pub(crate) fn callback(&self) -> impl FnMut(Vec<ImageRecord>) + Send + 'static {
        let writer = self.clone();
        move |images| writer.write(&images)
    }

    fn write(&self, images: &[ImageRecord]) {
        if let Err(e) = manifest::save(&self.path, images) {
            tracing::error!("Failed to save manifest: {:#}", e);
            if let Ok(mut slot) = self.error.lock() {
                if slot.is_none() {
                    *slot = Some(e);
                }
            }
        }
    }

    /// Fails when any write since the last call did not land on disk.
    pub(crate) fn finish(&self) -> Result<()> {
        let pending = match self.error.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(anyhow::anyhow!("Manifest writer lock poisoned")),
        };
        match pending {
            Some(e) => Err(e.context(format!(
                "{} is out of date with the server",
                self.path.display()
            ))),
            None => Ok(()),
        }
    }
}

/// Manager over the manifest at `manifest_path`, persisting every change.
pub(crate) fn open_manager(
    config_path: &Path,
    manifest_path: &Path,
) -> Result<(MediaManager, ManifestWriter)> {
    let config = Config::load_or_default(config_path)?;
    let images = manifest::load(manifest_path)?;
    let store = Arc::new(HttpImageStore::new(&config.api)?);

    let writer = ManifestWriter::new(manifest_path);
    let manager = MediaManager::from_config(&config, images, store, writer.callback())?;
    Ok((manager, writer))
}
