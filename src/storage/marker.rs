//! Last-sync marker used by the proxy check.
//!
//! A single git commit hash in a plain text file. The proxy check reviews
//! changes since this commit and advances it only after a fully passing run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default marker file name, relative to the reviewed repository.
pub const DEFAULT_MARKER_FILE: &str = ".last_sync_hash";

/// Handle to the marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMarker {
    path: PathBuf,
}

impl SyncMarker {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker at `marker_file` inside `repo`, unless `marker_file` is absolute.
    #[must_use]
    pub fn in_repo(repo: &Path, marker_file: &Path) -> Self {
        Self::new(repo.join(marker_file))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored hash, or `None` if the file is missing or blank.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let hash = content.trim();
        Ok((!hash.is_empty()).then(|| hash.to_string()))
    }

    /// Overwrite the marker with `hash`.
    ///
    /// # Errors
    ///
    /// Returns error if the parent directory or file cannot be written.
    pub fn write(&self, hash: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, hash.trim())?;
        tracing::debug!(path = %self.path.display(), "Updated sync marker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_marker_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let marker = SyncMarker::in_repo(dir.path(), Path::new(DEFAULT_MARKER_FILE));
        assert_eq!(marker.read().unwrap(), None);
    }

    #[test]
    fn write_then_read_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let marker = SyncMarker::in_repo(dir.path(), Path::new(DEFAULT_MARKER_FILE));
        marker.write("abc123\n").unwrap();
        assert_eq!(marker.read().unwrap().as_deref(), Some("abc123"));
        assert_eq!(fs::read_to_string(marker.path()).unwrap(), "abc123");
    }

    #[test]
    fn blank_marker_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let marker = SyncMarker::new(dir.path().join("marker"));
        fs::write(marker.path(), "  \n").unwrap();
        assert_eq!(marker.read().unwrap(), None);
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let marker = SyncMarker::new(dir.path().join("state/nested/marker"));
        marker.write("deadbeef").unwrap();
        assert_eq!(marker.read().unwrap().as_deref(), Some("deadbeef"));
    }

    #[test]
    fn absolute_marker_file_ignores_repo() {
        let dir = TempDir::new().unwrap();
        let absolute = dir.path().join("elsewhere");
        let marker = SyncMarker::in_repo(Path::new("/repo"), &absolute);
        assert_eq!(marker.path(), absolute);
    }
}
