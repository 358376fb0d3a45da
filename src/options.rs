use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-name prefixes that are never walked.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git", ".next", ".cursor"];

/// Path suffixes that are never captured (environment files and lockfiles).
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.development",
    ".env.production",
    ".env.test",
    "package-lock.json",
];

/// Directory names hidden from the tree listing only.
pub const DEFAULT_TREE_EXCLUDE_DIRS: &[&str] = &["node_modules", ".next", ".vercel", "supabase"];

pub const DEFAULT_INCLUDE_EXTENSIONS: &[&str] =
    &[".tsx", ".ts", ".js", ".css", ".json", ".prisma", ".md"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeStyle {
    /// Run an external `tree` program.
    Command,
    /// Render the listing in-process.
    Builtin,
    /// Omit the directory structure header.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotOptions {
    #[serde(skip)]
    pub root: PathBuf,
    pub exclude_dirs: Vec<String>,
    pub exclude_files: Vec<String>,
    pub tree_exclude_dirs: Vec<String>,
    pub include_extensions: Vec<String>,
    pub ignore_file: String,
    pub output_subdir: String,
    pub tree: TreeStyle,
    pub tree_program: String,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude_dirs: owned(DEFAULT_EXCLUDE_DIRS),
            exclude_files: owned(DEFAULT_EXCLUDE_FILES),
            tree_exclude_dirs: owned(DEFAULT_TREE_EXCLUDE_DIRS),
            include_extensions: owned(DEFAULT_INCLUDE_EXTENSIONS),
            ignore_file: ".gitignore".to_string(),
            output_subdir: "docs".to_string(),
            tree: TreeStyle::Command,
            tree_program: "tree".to_string(),
        }
    }
}

impl SnapshotOptions {
    /// Reads options from a JSON file. Keys missing from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn ignore_file_path(&self) -> PathBuf {
        self.root.join(&self.ignore_file)
    }

    /// The `docs` subdirectory when it exists, otherwise the root itself.
    pub fn output_dir(&self) -> PathBuf {
        let candidate = self.root.join(&self.output_subdir);
        if !self.output_subdir.is_empty() && candidate.is_dir() {
            candidate
        } else {
            self.root.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    options: SnapshotOptions,
}
impl SnapshotBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            options: SnapshotOptions {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    /// Starts from previously loaded options, replacing only the root.
    pub fn from_options(root: impl Into<PathBuf>, options: SnapshotOptions) -> Self {
        Self {
            options: SnapshotOptions {
                root: root.into(),
                ..options
            },
        }
    }
    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.options.exclude_dirs = dirs;
        self
    }
    pub fn exclude_files(mut self, files: Vec<String>) -> Self {
        self.options.exclude_files = files;
        self
    }
    pub fn tree_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.options.tree_exclude_dirs = dirs;
        self
    }
    pub fn include_extensions(mut self, extensions: Vec<String>) -> Self {
        self.options.include_extensions = extensions;
        self
    }
    pub fn ignore_file(mut self, name: impl Into<String>) -> Self {
        self.options.ignore_file = name.into();
        self
    }
    pub fn output_subdir(mut self, name: impl Into<String>) -> Self {
        self.options.output_subdir = name.into();
        self
    }
    pub fn tree(mut self, style: TreeStyle) -> Self {
        self.options.tree = style;
        self
    }
    pub fn tree_program(mut self, program: impl Into<String>) -> Self {
        self.options.tree_program = program.into();
        self
    }
    pub fn build(self) -> SnapshotOptions {
        self.options
    }
}
