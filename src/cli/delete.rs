use super::{open_manager, print_notices};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, manifest_path: &Path, index: usize) -> Result<()> {
    let (mut manager, writer) = open_manager(config_path, manifest_path)?;

    let result = manager.remove(index).await;
    print_notices(manager.take_notices());
    result?;
    writer.finish()?;

    Ok(())
}
