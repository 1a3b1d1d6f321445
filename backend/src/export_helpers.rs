use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::logger::debug;

/// Pretty JSON with two-space indent. Non-ASCII text is written as is.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    Ok(s)
}

/// Serialize the full result first, then write it to a temporary file next to
/// the destination and rename it over the destination. A failed run leaves no
/// partial output behind.
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json = to_json_pretty(value)?;

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(output_path).map_err(|e| e.error)?;

    debug(&format!("Wrote {} bytes to {}", json.len(), output_path.display()));
    Ok(())
}
