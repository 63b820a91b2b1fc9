//! All-or-nothing file output.

use cutdetect_core::{CutDetectError, Result};
use std::io::Write;
use std::path::Path;

/// Write `contents` to `path` so the file appears complete or not at all.
///
/// The text goes to a temporary file beside `path`, which is then renamed
/// over it. On failure the temporary file is removed and `path` is untouched.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source| CutDetectError::EdlWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".cutdetect-")
        .suffix(".edl.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
