// # One-shot export
//
// Writes every configured target/format pair into the output folder as
// `phonebook_<target>_<format>.xml`.

use anyhow::{Context, Result};
use phonebook_core::config::ExportConfig;
use phonebook_core::entry::Snapshot;
use phonebook_core::exporter::Format;
use phonebook_core::registry::Registry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name for one phonebook
pub fn file_name(target: &str, format: Format) -> String {
    format!("phonebook_{}_{}.xml", target, format)
}

/// Render and write all phonebooks, returning the written paths
///
/// Stops at the first render or write failure.
pub async fn write_phonebooks(registry: &Registry, snapshot: &Snapshot, export: &ExportConfig) -> Result<Vec<PathBuf>> {
    let dir = export
        .path
        .as_deref()
        .context("output path needs to be set")?;
    let formats = export.parsed_formats()?;

    let mut written = Vec::new();
    for target in &export.targets {
        let target = target.trim().to_lowercase();
        for format in &formats {
            let body = registry.render(&target, snapshot, &export.options(*format))?;
            let path = Path::new(dir).join(file_name(&target, *format));
            tokio::fs::write(&path, &body)
                .await
                .with_context(|| format!("unable to write {}", path.display()))?;
            debug!("Wrote {} bytes to {}", body.len(), path.display());
            written.push(path);
        }
    }

    Ok(written)
}
