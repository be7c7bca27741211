use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;

    let config_path = path.join("chalet-media.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = r#"[api]
base_url = "http://localhost:8080"
upload_path = "/v1/images/upload"
delete_path = "/v1/images"
field_name = "images"
timeout_secs = 300

[upload]
max_images = 15
max_file_size = "25MB"
max_total_size = "250MB"
allowed_types = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"]

[retry]
max_retries = 3
base_delay_ms = 2000
max_jitter_ms = 1000

[progress]
tick_ms = 2000
ceiling = 95

[labels]
max_length = 50
"#;

    std::fs::write(&config_path, config)?;

    tracing::info!("Created {}", config_path.display());
    tracing::info!("Set api.base_url to your image API, then run 'chalet-media upload <files>'");

    Ok(())
}
