//! Temporary per-page image files.
//!
//! Each captured page is written next to the output document, embedded,
//! and removed once the run is over. Removal failures are collected rather
//! than raised.

use std::path::{Path, PathBuf};

pub struct TempPages {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl TempPages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// File name used for page `page` (1-based).
    pub fn file_name(page: u32) -> String {
        format!(".pagesnap-page-{:04}.jpg", page)
    }

    /// Writes the encoded image for `page` and tracks it for cleanup.
    pub fn write(&mut self, page: u32, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.join(Self::file_name(page));
        std::fs::write(&path, bytes)?;
        self.files.push(path.clone());
        Ok(path)
    }

    #[cfg(test)]
    pub(crate) fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    /// Deletes every tracked file. Returns one message per file that could
    /// not be removed.
    pub fn cleanup(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        for path in self.files.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("[SESSION] Could not delete {}: {}", path.display(), e);
                warnings.push(format!("Failed to delete {}: {}", display_name(&path), e));
            }
        }
        warnings
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(TempPages::file_name(7), ".pagesnap-page-0007.jpg");
    }

    #[test]
    fn cleanup_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = TempPages::new(dir.path());
        let a = temp.write(1, b"one").unwrap();
        let b = temp.write(2, b"two").unwrap();
        assert!(a.exists() && b.exists());

        let warnings = temp.cleanup();
        assert!(warnings.is_empty());
        assert!(!a.exists() && !b.exists());
        assert!(temp.paths().is_empty());
    }

    #[test]
    fn cleanup_reports_files_it_cannot_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = TempPages::new(dir.path());
        let a = temp.write(1, b"one").unwrap();
        temp.write(2, b"two").unwrap();
        std::fs::remove_file(&a).unwrap();

        let warnings = temp.cleanup();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(".pagesnap-page-0001.jpg"));
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut temp = TempPages::new(dir.path().join("missing"));
        assert!(temp.write(1, b"x").is_err());
        assert!(temp.paths().is_empty());
    }
}
