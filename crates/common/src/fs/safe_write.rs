use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Writes whole files through a sibling temp file and an atomic rename.
///
/// A reader either sees the previous content or the new content, never a
/// truncated file.
#[derive(Debug, Clone)]
pub struct SafeFileWriter {
    sync: bool,
}

impl Default for SafeFileWriter {
    fn default() -> Self {
        Self { sync: true }
    }
}

impl SafeFileWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip fsync of the file and its directory. Faster, less durable.
    pub fn without_sync(mut self) -> Self {
        self.sync = false;
        self
    }

    /// Replaces `path` with `content`, creating parent directories first.
    pub fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            super::ensure_dir(parent)?;
        }

        let temp_path = temp_path_for(path);
        let result = self.write_temp(&temp_path, content).and_then(|()| {
            fs::rename(&temp_path, path)?;
            if self.sync {
                if let Some(parent) = parent {
                    sync_dir(parent)?;
                }
            }
            Ok(())
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_temp(&self, temp_path: &Path, content: &[u8]) -> io::Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        if self.sync {
            file.sync_all()?;
        }
        Ok(())
    }
}

// Unique per call so concurrent writers never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}

#[cfg(target_family = "unix")]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directories cannot be opened for fsync on Windows.
#[cfg(not(target_family = "unix"))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a/b/c/log.json");

        SafeFileWriter::new().write(&target, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
    }

    #[test]
    fn replaces_existing_content_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("log.json");
        fs::write(&target, "old content that is longer").unwrap();

        SafeFileWriter::new().write(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn temp_names_are_unique_siblings() {
        let target = Path::new("/var/lib/actlog/log.json");
        let a = temp_path_for(target);
        let b = temp_path_for(target);
        assert_ne!(a, b);
        assert_eq!(a.parent(), target.parent());
        assert!(a.file_name().unwrap().to_string_lossy().starts_with(".log.json."));
    }
}
