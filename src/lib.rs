//! # Codesnap
//!
//! `codesnap` walks a project directory and concatenates the contents of its
//! source files into plain-text snapshot files, each prefixed with a listing
//! of the directory structure. A snapshot is meant to be handed to a reviewer
//! or a language model as a single artifact.
//!
//! Files are selected by two independent rule sets: an [`ExclusionRules`]
//! (fixed directory and file names plus the patterns of the project's
//! `.gitignore`) and an [`InclusionFilter`] (an extension allow-list). A file
//! is captured only when it and every directory above it pass both.
//!
//! Nothing here is fatal: unreadable files and directories, write failures,
//! and a missing `tree` program are logged and skipped.
//!
//! # Example
//!
//! ```no_run
//! use codesnap::{SnapshotBuilder, Snapshotter, TreeStyle};
//!
//! let options = SnapshotBuilder::new(".")
//!     .tree(TreeStyle::Builtin)
//!     .include_extensions(vec![".rs".into(), ".toml".into()])
//!     .build();
//!
//! let snapshotter = Snapshotter::new(options);
//! let report = snapshotter.full();
//! println!("{} files written to {}", report.files.len(), report.path.display());
//! ```

mod engine;
mod error;
pub mod logging;
mod options;
pub mod output;
mod rules;
pub mod select;
mod snapshot;
mod tree;
mod types;

pub use engine::{WalkStats, Walker, relative_path};
pub use error::SnapshotError;
pub use options::{
    DEFAULT_EXCLUDE_DIRS, DEFAULT_EXCLUDE_FILES, DEFAULT_INCLUDE_EXTENSIONS,
    DEFAULT_TREE_EXCLUDE_DIRS, SnapshotBuilder, SnapshotOptions, TreeStyle,
};
pub use rules::{ExclusionRules, InclusionFilter, load_ignore_patterns};
pub use select::Selection;
pub use snapshot::{DEFAULT_SINGLE_OUTPUT, SnapshotNaming, Snapshotter};
pub use tree::{BuiltinTree, NoTree, TreeCommand, TreeRenderer, renderer_for};
pub use types::{SnapshotReport, SnapshotTarget, TraversalMode};
