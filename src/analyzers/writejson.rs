use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Serializes a value as pretty JSON and writes it to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &impl Serialize) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &body)?;

    info!(path = %path.display(), bytes = body.len(), "JSON written");
    Ok(())
}
