//! Snapshot artifact writing.
//!
//! A snapshot is a directory-structure header followed by one section per
//! captured file:
//!
//! ```text
//! --- Project Directory Structure ---
//! Current directory: ./
//! <tree listing>
//!
//!
//! --- src/main.ts ---
//! <raw file content>
//! ```
//!
//! File content is copied byte-for-byte with no escaping.

use crate::error::SnapshotError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const STRUCTURE_HEADER: &str = "--- Project Directory Structure ---";
pub const TREE_ERROR_PLACEHOLDER: &str = "Error generating tree output";

/// Header text for a rendered listing of `dir_label`.
pub fn tree_header(dir_label: &str, tree: &str) -> String {
    format!(
        "{}\nCurrent directory: {}/\n{}\n",
        STRUCTURE_HEADER, dir_label, tree
    )
}

/// Header text used when the listing could not be produced.
pub fn tree_error_header() -> String {
    format!("{}\n{}\n\n", STRUCTURE_HEADER, TREE_ERROR_PLACEHOLDER)
}

/// Section marker written before each file's content.
pub fn section_header(relative: &str) -> String {
    format!("\n--- {} ---\n", relative)
}

/// Appends file sections to a single snapshot artifact.
///
/// Every write failure is logged and counted; later writes are still attempted.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    errors: usize,
}

impl SnapshotWriter {
    /// Removes any previous artifact at `path` and makes sure its parent
    /// directory exists. Nothing is written until [`SnapshotWriter::start`].
    pub fn create(path: impl Into<PathBuf>) -> Self {
        let mut writer = Self {
            path: path.into(),
            errors: 0,
        };
        if let Err(e) = writer.clear() {
            warn!("Error preparing {}: {}", writer.path.display(), e);
            writer.errors += 1;
        }
        writer
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Cleared previous snapshot at {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SnapshotError::io(&self.path, e)),
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
        }
        Ok(())
    }

    /// Creates the artifact holding only `header`.
    pub fn start(&mut self, header: &str) {
        if let Err(e) = fs::write(&self.path, header) {
            warn!("Error creating {}: {}", self.path.display(), e);
            self.errors += 1;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Appends `\n--- <relative> ---\n` followed by `content`.
    pub fn append(&mut self, relative: &str, content: &[u8]) -> bool {
        match self.try_append(relative, content) {
            Ok(()) => {
                info!("Successfully wrote {} to {}", relative, self.path.display());
                true
            }
            Err(e) => {
                warn!("Error writing {} to {}: {}", relative, self.path.display(), e);
                self.errors += 1;
                false
            }
        }
    }

    fn try_append(&self, relative: &str, content: &[u8]) -> Result<(), SnapshotError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| SnapshotError::io(&self.path, e))?;
        file.write_all(section_header(relative).as_bytes())
            .and_then(|_| file.write_all(content))
            .map_err(|e| SnapshotError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_replaces_previous_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.txt");
        fs::write(&path, "stale content").unwrap();

        let mut writer = SnapshotWriter::create(&path);
        assert!(!path.exists());
        writer.start(&tree_header(".", ".\n"));
        assert!(writer.append("a.ts", b"let a;\n"));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "--- Project Directory Structure ---\nCurrent directory: ./\n.\n\n\n--- a.ts ---\nlet a;\n"
        );
        assert_eq!(writer.errors(), 0);
    }

    #[test]
    fn create_makes_missing_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs/out/snap.txt");
        let mut writer = SnapshotWriter::create(&path);
        writer.start(&tree_error_header());
        assert_eq!(
            fs::read_to_string(writer.path()).unwrap(),
            "--- Project Directory Structure ---\nError generating tree output\n\n"
        );
    }

    #[test]
    fn append_failure_is_counted() {
        let dir = tempdir().unwrap();
        // A directory in place of the artifact makes every write fail.
        let path = dir.path().join("snap.txt");
        let mut writer = SnapshotWriter::create(&path);
        writer.start("");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(!writer.append("a.ts", b"a"));
        assert!(!writer.append("b.ts", b"b"));
        assert_eq!(writer.errors(), 2);
    }
}
