use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a snapshot target's root is traversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Every eligible file beneath the root.
    Recursive,
    /// Only regular files directly inside the root.
    TopLevel,
    /// The listed paths, resolved against the root.
    FileList(Vec<String>),
}

/// One output artifact and how to fill it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotTarget {
    /// Where the snapshot is written. Any existing file here is replaced.
    pub path: PathBuf,
    /// Directory walked, and the base that section headers are relative to.
    pub root: PathBuf,
    pub mode: TraversalMode,
}

/// What a single snapshot run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotReport {
    /// The artifact written.
    pub path: PathBuf,
    /// Relative paths of captured files, in the order written.
    pub files: Vec<String>,
    /// Entries left out because of an exclusion rule, the inclusion filter,
    /// or because a listed path did not exist.
    pub skipped: usize,
    /// Read, list, and write failures that were logged and absorbed.
    pub errors: usize,
    /// Whether the directory structure header fell back to the error notice.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tree_failed: bool,
}
