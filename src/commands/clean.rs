//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Preview;

/// Delete the generated preview
pub fn run(preview: &Preview) -> Result<()> {
    if preview.public_dir.exists() {
        fs::remove_dir_all(&preview.public_dir)?;
        tracing::info!("Deleted: {:?}", preview.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", preview.public_dir);
    }
    Ok(())
}
