//! Export file writing.
//!
//! Exports are written atomically (temp file, then rename) with an optional
//! `.bak` copy of the previous file. Targets ending in `.gz` are compressed.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes an export payload to `path`.
///
/// # Arguments
///
/// * `path` - Target file; a `.gz` suffix enables compression
/// * `payload` - The JSON text to write
/// * `create_backup` - Copy an existing target to `<name>.bak` first
///
/// # Errors
///
/// Returns an error if the payload is not valid JSON, if the backup cannot
/// be created, or if writing or renaming the temp file fails.
///
/// # Examples
///
/// ```no_run
/// use casequill::file::saver::save_export;
///
/// save_export("test_cases.json", "[]", false).unwrap();
/// ```
pub fn save_export<P: AsRef<Path>>(path: P, payload: &str, create_backup: bool) -> Result<()> {
    let path = path.as_ref();

    // Validate before touching the disk
    serde_json::from_str::<serde_json::Value>(payload)
        .context("Refusing to write an export that is not valid JSON")?;

    if create_backup && path.exists() {
        backup_file(path)?;
    }

    let compress = path.to_string_lossy().ends_with(".gz");
    let mut data = payload.to_string();
    if !data.ends_with('\n') {
        data.push('\n');
    }
    write_file_atomic(path, data.as_bytes(), compress)?;
    tracing::debug!("Wrote export to {}", path.display());

    Ok(())
}

/// Creates a backup of a file by copying it with a .bak extension.
fn backup_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut backup_path = path.to_path_buf();
    let original_name = backup_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    backup_path.set_file_name(format!("{}.bak", original_name));
    fs::copy(path, backup_path).context("Failed to create backup")?;
    Ok(())
}

/// Writes data to a file atomically, optionally compressing with gzip.
///
/// The data goes to `<file name>.tmp` next to the target first. The temp
/// file is removed again if writing or renaming fails.
fn write_file_atomic<P: AsRef<Path>>(path: P, data: &[u8], compress: bool) -> Result<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path)?;

    let result = write_temp(&temp_path, data, compress).and_then(|()| {
        // Atomic rename
        fs::rename(&temp_path, path).context("Failed to rename temp file")
    });
    if result.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!("Could not remove {}: {}", temp_path.display(), e);
        }
    }
    result
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    Ok(path.with_file_name(format!("{}.tmp", file_name)))
}

fn write_temp(temp_path: &Path, data: &[u8], compress: bool) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    if compress {
        let file = fs::File::create(temp_path).context("Failed to create temp file")?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write compressed data")?;
        encoder.finish().context("Failed to finish compression")?;
    } else {
        fs::write(temp_path, data).context("Failed to write temp file")?;
    }
    Ok(())
}
