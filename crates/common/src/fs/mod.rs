//! Filesystem helpers used by the log: recursive directory creation,
//! UTF-8 reads and atomic writes.

mod safe_write;

pub use safe_write::SafeFileWriter;

use std::fs;
use std::io;
use std::path::Path;

/// Creates `dir` and all missing parents.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Reads a UTF-8 file, returning `None` when it does not exist.
pub fn read_text_if_exists(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
