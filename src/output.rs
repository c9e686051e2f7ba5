//! File output helpers.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `bytes` to a temporary file next to `path` and rename it over
/// `path`. A failure leaves any existing file at `path` untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Plain overwrite, for artifacts where a torn write does no harm.
pub fn write_plain(path: &Path, bytes: &[u8]) -> Result<()> {
    parent_dir(path)?;
    fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

fn parent_dir(path: &Path) -> Result<&Path> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    Ok(dir)
}
