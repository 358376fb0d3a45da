//! Directory structure listings written at the top of every snapshot.

use crate::error::SnapshotError;
use crate::options::TreeStyle;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces a textual listing of `directory`, leaving out `excluded` names.
pub trait TreeRenderer {
    fn render(&self, directory: &Path, excluded: &[String]) -> Result<String, SnapshotError>;
}

/// Runs an external `tree` program in the target directory.
#[derive(Debug, Clone)]
pub struct TreeCommand {
    program: String,
}

impl TreeCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TreeCommand {
    fn default() -> Self {
        Self::new("tree")
    }
}

impl TreeRenderer for TreeCommand {
    fn render(&self, directory: &Path, excluded: &[String]) -> Result<String, SnapshotError> {
        let mut command = Command::new(&self.program);
        if !excluded.is_empty() {
            command.arg("-I").arg(excluded.join("|"));
        }
        let output = command
            .current_dir(directory)
            .output()
            .map_err(|e| SnapshotError::TreeCommand(format!("{}: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(SnapshotError::TreeCommand(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// In-process listing for machines without a `tree` program.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTree;

impl TreeRenderer for BuiltinTree {
    fn render(&self, directory: &Path, excluded: &[String]) -> Result<String, SnapshotError> {
        let matcher = exclusion_matcher(excluded)?;
        let mut builder = WalkBuilder::new(directory);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                entry.depth() == 0 || !matcher.is_match(entry.file_name())
            });
        let mut entries = Vec::new();
        for result in builder.build() {
            let entry = result.map_err(|e| SnapshotError::Walk(e.to_string()))?;
            entries.push(entry.into_path());
        }
        Ok(build_tree_from_entries(directory, &entries))
    }
}

/// An empty listing; the structure header is still written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTree;

impl TreeRenderer for NoTree {
    fn render(&self, _directory: &Path, _excluded: &[String]) -> Result<String, SnapshotError> {
        Ok(String::new())
    }
}

/// The renderer configured by a [`TreeStyle`].
pub fn renderer_for(style: TreeStyle, program: &str) -> Box<dyn TreeRenderer> {
    match style {
        TreeStyle::Command => Box::new(TreeCommand::new(program)),
        TreeStyle::Builtin => Box::new(BuiltinTree),
        TreeStyle::None => Box::new(NoTree),
    }
}

fn exclusion_matcher(excluded: &[String]) -> Result<GlobSet, SnapshotError> {
    let mut builder = GlobSetBuilder::new();
    for name in excluded {
        let glob = Glob::new(name).map_err(|e| {
            SnapshotError::Walk(format!("Invalid tree exclusion '{}': {}", name, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SnapshotError::Walk(format!("Failed to build glob set: {}", e)))
}

/// Builds a `tree`-style listing from a root directory and the paths beneath it.
///
/// Entries must already be in depth-first, name-sorted order.
pub(crate) fn build_tree_from_entries(root: &Path, entries: &[PathBuf]) -> String {
    let relative: Vec<&Path> = entries
        .iter()
        .filter(|p| p.as_path() != root)
        .map(|p| p.strip_prefix(root).unwrap_or(p))
        .collect();

    let mut lines = vec![".".to_string()];
    let (mut dirs, mut files) = (0usize, 0usize);
    for (i, path) in relative.iter().enumerate() {
        let depth = path.components().count();
        let mut prefix = String::new();
        for level in 1..depth {
            let ancestor: PathBuf = path.components().take(level).collect();
            prefix.push_str(if has_later_sibling(&relative[i..], &ancestor) {
                "│   "
            } else {
                "    "
            });
        }
        prefix.push_str(if has_later_sibling(&relative[i..], path) {
            "├── "
        } else {
            "└── "
        });
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        lines.push(format!("{}{}", prefix, name));
        if root.join(path).is_dir() {
            dirs += 1;
        } else {
            files += 1;
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{} director{}, {} file{}",
        dirs,
        if dirs == 1 { "y" } else { "ies" },
        files,
        if files == 1 { "" } else { "s" }
    ));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// True when another entry after `rest[0]` shares `node`'s parent and depth.
fn has_later_sibling(rest: &[&Path], node: &Path) -> bool {
    let depth = node.components().count();
    let parent = node.parent();
    rest.iter()
        .skip_while(|p| !p.starts_with(node))
        .skip(1)
        .any(|p| p.components().count() == depth && p.parent() == parent && *p != node)
}
