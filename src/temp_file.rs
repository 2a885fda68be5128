use std::fs;
use std::path::{Path, PathBuf};

/// Deletes the underlying file when dropped, so handlers that bail out early
/// don't leak downloaded or half-encoded videos.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                log::warn!("Failed to remove temp file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_file_on_drop() {
        let path = std::env::temp_dir().join("coverbot_tempfile_test.bin");
        fs::write(&path, b"scratch").unwrap();
        assert!(path.exists());

        drop(TempFile::new(&path));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("coverbot_tempfile_never_created.bin");
        drop(TempFile::new(path));
    }
}
