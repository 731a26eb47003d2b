use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty JSON for stdout
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}

/// Write pretty JSON to a file
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}
