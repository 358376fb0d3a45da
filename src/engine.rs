use crate::error::SnapshotError;
use crate::rules::{ExclusionRules, InclusionFilter};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `path` relative to `base`, joined with `/` regardless of platform.
pub fn relative_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Counts of what a walk did with the entries it saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub emitted: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Recursive directory walker applying exclusion rules to directories and
/// both exclusion and inclusion rules to files.
#[derive(Debug, Clone)]
pub struct Walker {
    rules: Arc<ExclusionRules>,
    inclusion: Arc<InclusionFilter>,
    skip: Option<PathBuf>,
}

impl Walker {
    pub fn new(rules: Arc<ExclusionRules>, inclusion: Arc<InclusionFilter>) -> Self {
        Self {
            rules,
            inclusion,
            skip: None,
        }
    }

    /// Never emit `path`, typically the snapshot being written.
    ///
    /// `path` may be relative to the working directory; it is resolved here
    /// so it matches entries under any spelling of the walked root.
    pub fn skipping(mut self, path: impl AsRef<Path>) -> Self {
        self.skip = Some(resolve_on_disk(path.as_ref()));
        self
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let Some(skip) = self.skip.as_deref() else {
            return false;
        };
        if path.file_name() != skip.file_name() {
            return false;
        }
        path == skip || fs::canonicalize(path).is_ok_and(|resolved| resolved == skip)
    }

    fn accepts_file(&self, relative: &str) -> bool {
        !self.rules.is_excluded(relative) && self.inclusion.is_included(relative)
    }

    /// Walks `directory`, calling `emit` with each eligible file's path
    /// relative to `base` and its raw bytes, in directory listing order.
    ///
    /// Unreadable files and directories are logged and skipped.
    pub fn walk<F>(&self, directory: &Path, base: &Path, mut emit: F) -> WalkStats
    where
        F: FnMut(&str, &[u8]),
    {
        let mut stats = WalkStats::default();
        info!("Reading directory: {}", directory.display());

        let rules = Arc::clone(&self.rules);
        let prune_base = base.to_path_buf();
        let mut builder = WalkBuilder::new(directory);
        builder
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                let relative = relative_path(&prune_base, entry.path());
                if rules.is_excluded(&relative) {
                    info!("Skipping excluded directory: {}", relative);
                    return false;
                }
                true
            });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing directory: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                info!("Reading directory: {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            let relative = relative_path(base, entry.path());
            if self.is_skipped(entry.path()) {
                debug!("Skipping snapshot output: {}", relative);
                continue;
            }
            if !self.accepts_file(&relative) {
                info!("Skipping file: {} (excluded or not included)", relative);
                stats.skipped += 1;
                continue;
            }
            emit_file(entry.path(), &relative, &mut stats, &mut emit);
        }
        stats
    }

    /// Like [`Walker::walk`] but only over the regular files directly inside
    /// `directory`.
    pub fn walk_top_level<F>(&self, directory: &Path, mut emit: F) -> WalkStats
    where
        F: FnMut(&str, &[u8]),
    {
        let mut stats = WalkStats::default();
        let entries = match list_directory(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error accessing top-level directory: {}", e);
                stats.errors += 1;
                return stats;
            }
        };
        for (path, file_type) in entries {
            if !file_type.is_file() {
                continue;
            }
            if self.is_skipped(&path) {
                debug!("Skipping snapshot output: {}", path.display());
                continue;
            }
            let relative = relative_path(directory, &path);
            if !self.accepts_file(&relative) {
                info!("Skipping file: {} (excluded or not included)", relative);
                stats.skipped += 1;
                continue;
            }
            emit_file(&path, &relative, &mut stats, &mut emit);
        }
        stats
    }

    /// Captures an explicit list of paths resolved against `root`.
    ///
    /// Each entry that escapes the root, does not exist, is excluded, or is
    /// not included is logged and skipped on its own.
    pub fn walk_listed<F>(&self, root: &Path, listed: &[String], mut emit: F) -> WalkStats
    where
        F: FnMut(&str, &[u8]),
    {
        let mut stats = WalkStats::default();
        for raw in listed.iter().map(|raw| raw.trim()) {
            if raw.is_empty() {
                debug!("Ignoring empty file list entry");
                continue;
            }
            let relative = match resolve_listed(root, raw) {
                Ok(relative) => relative,
                Err(reason) => {
                    info!("Skipping file: {} ({})", raw, reason);
                    stats.skipped += 1;
                    continue;
                }
            };
            let path = root.join(&relative);
            let reason = if !path.is_file() {
                Some("does not exist")
            } else if self.rules.is_excluded(&relative) {
                Some("excluded")
            } else if !self.inclusion.is_included(&relative) {
                Some("not included")
            } else {
                None
            };
            if let Some(reason) = reason {
                info!("Skipping file: {} ({})", relative, reason);
                stats.skipped += 1;
                continue;
            }
            emit_file(&path, &relative, &mut stats, &mut emit);
        }
        stats
    }

    /// Direct child directories of `directory` that are not excluded.
    pub fn top_level_directories(&self, directory: &Path) -> Vec<PathBuf> {
        match list_directory(directory) {
            Ok(entries) => entries
                .into_iter()
                .filter(|(path, file_type)| {
                    file_type.is_dir() && !self.rules.is_excluded(&relative_path(directory, path))
                })
                .map(|(path, _)| path)
                .collect(),
            Err(e) => {
                warn!("Error accessing top-level directory: {}", e);
                Vec::new()
            }
        }
    }
}

fn list_directory(directory: &Path) -> Result<Vec<(PathBuf, fs::FileType)>, SnapshotError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(directory).map_err(|e| SnapshotError::io(directory, e))? {
        let entry = entry.map_err(|e| SnapshotError::io(directory, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| SnapshotError::io(entry.path(), e))?;
        entries.push((entry.path(), file_type));
    }
    Ok(entries)
}

const OUTSIDE_ROOT: &str = "outside the project root";

/// Lexically normalizes a listed path to a `/`-joined path under `root`.
///
/// The error is the reason the entry cannot name a file in the project.
fn resolve_listed(root: &Path, listed: &str) -> Result<String, &'static str> {
    let listed = Path::new(listed);
    let candidate = if listed.is_absolute() {
        listed.strip_prefix(root).map_err(|_| OUTSIDE_ROOT)?
    } else {
        listed
    };
    let mut parts: Vec<String> = Vec::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop().ok_or(OUTSIDE_ROOT)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(OUTSIDE_ROOT),
        }
    }
    if parts.is_empty() {
        Err("the project root itself")
    } else {
        Ok(parts.join("/"))
    }
}

/// The canonical form of `path`, or of its parent joined with its file name
/// when the file does not exist yet.
fn resolve_on_disk(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

fn emit_file<F>(path: &Path, relative: &str, stats: &mut WalkStats, emit: &mut F)
where
    F: FnMut(&str, &[u8]),
{
    match read_file_content(path) {
        Ok(content) => {
            emit(relative, &content);
            stats.emitted += 1;
        }
        Err(e) => {
            warn!("Error reading {}: {}", relative, e);
            stats.errors += 1;
        }
    }
}

fn read_file_content(path: &Path) -> Result<Vec<u8>, SnapshotError> {
    fs::read(path).map_err(|e| SnapshotError::io(path, e))
}
