use std::path::Path;

use anyhow::{Context, Result, bail};

/// Extensions offered for analysis
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "mpeg", "wav"];

/// List selectable audio files in a directory, sorted by name
pub fn list_audio_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        bail!("Files directory not found: {:?}", dir);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list files in {:?}", dir))? {
        let entry = entry.with_context(|| format!("Failed to list files in {:?}", dir))?;
        let path = entry.path();
        if !path.is_file() || !is_audio_file(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }

    files.sort();
    Ok(files)
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Reject anything that is not a bare file name
pub fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid filename: {:?}", name);
    }
    Ok(())
}
