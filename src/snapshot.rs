//! Snapshot orchestration: naming, targets, and the snapshot modes.

use crate::engine::{Walker, relative_path};
use crate::options::SnapshotOptions;
use crate::output::{SnapshotWriter, tree_error_header, tree_header};
use crate::rules::{ExclusionRules, InclusionFilter};
use crate::select::Selection;
use crate::tree::{TreeRenderer, renderer_for};
use crate::types::{SnapshotReport, SnapshotTarget, TraversalMode};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Output file used by [`Snapshotter::single`] when no path is given.
pub const DEFAULT_SINGLE_OUTPUT: &str = "code_snapshot.txt";

/// Date-stamped artifact names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNaming {
    date: String,
}

impl SnapshotNaming {
    /// Stamped with today's local date as `YYYYMMDD`.
    pub fn today() -> Self {
        Self::for_date(Local::now().format("%Y%m%d").to_string())
    }

    pub fn for_date(date: impl Into<String>) -> Self {
        Self { date: date.into() }
    }

    pub fn full(&self) -> String {
        format!("{}-allfiles-code_snapshot.txt", self.date)
    }

    pub fn top_level(&self) -> String {
        format!("{}-code_snapshot.txt", self.date)
    }

    pub fn directory(&self, name: &str) -> String {
        format!("{}-{}-code_snapshot.txt", self.date, name)
    }

    pub fn file_list(&self) -> String {
        format!("special-code-snapshot-{}.txt", self.date)
    }
}

/// Produces snapshot artifacts for one project root.
///
/// The ignore file is read once, when the snapshotter is built, and the
/// resulting rules are shared by every snapshot it produces.
pub struct Snapshotter {
    options: SnapshotOptions,
    rules: Arc<ExclusionRules>,
    inclusion: Arc<InclusionFilter>,
    renderer: Box<dyn TreeRenderer>,
    naming: SnapshotNaming,
    output_dir: PathBuf,
}

impl Snapshotter {
    pub fn new(options: SnapshotOptions) -> Self {
        let rules = ExclusionRules::from_options(&options);
        let inclusion = InclusionFilter::new(options.include_extensions.clone());
        let renderer = renderer_for(options.tree, &options.tree_program);
        let output_dir = options.output_dir();
        Self {
            rules: Arc::new(rules),
            inclusion: Arc::new(inclusion),
            renderer,
            naming: SnapshotNaming::today(),
            output_dir,
            options,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn TreeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_naming(mut self, naming: SnapshotNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn root(&self) -> &Path {
        &self.options.root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    fn header_for(&self, target: &SnapshotTarget) -> (String, bool) {
        let mut label = relative_path(&self.options.root, &target.root);
        if label.is_empty() {
            label.push('.');
        }
        match self
            .renderer
            .render(&target.root, &self.options.tree_exclude_dirs)
        {
            Ok(tree) => {
                info!("Prepended tree output to {}", target.path.display());
                (tree_header(&label, &tree), false)
            }
            Err(e) => {
                warn!(
                    "Error generating tree output for {}: {}",
                    target.path.display(),
                    e
                );
                (tree_error_header(), true)
            }
        }
    }

    /// Writes one snapshot artifact, replacing whatever was at its path.
    pub fn capture(&self, target: &SnapshotTarget) -> SnapshotReport {
        let mut writer = SnapshotWriter::create(&target.path);
        let (header, tree_failed) = self.header_for(target);
        writer.start(&header);
        let walker = Walker::new(Arc::clone(&self.rules), Arc::clone(&self.inclusion))
            .skipping(&target.path);

        let mut files = Vec::new();
        let stats = {
            let mut emit = |relative: &str, content: &[u8]| {
                if writer.append(relative, content) {
                    files.push(relative.to_string());
                }
            };
            match &target.mode {
                TraversalMode::Recursive => walker.walk(&target.root, &target.root, &mut emit),
                TraversalMode::TopLevel => walker.walk_top_level(&target.root, &mut emit),
                TraversalMode::FileList(listed) => {
                    walker.walk_listed(&target.root, listed, &mut emit)
                }
            }
        };

        SnapshotReport {
            path: target.path.clone(),
            files,
            skipped: stats.skipped,
            errors: stats.errors + writer.errors(),
            tree_failed,
        }
    }

    /// Every eligible file in the project.
    pub fn full(&self) -> SnapshotReport {
        let report = self.capture(&SnapshotTarget {
            path: self.output_dir.join(self.naming.full()),
            root: self.options.root.clone(),
            mode: TraversalMode::Recursive,
        });
        info!("Main code snapshot created at {}", report.path.display());
        report
    }

    /// Eligible files sitting directly in the project root.
    pub fn top_level(&self) -> SnapshotReport {
        let report = self.capture(&SnapshotTarget {
            path: self.output_dir.join(self.naming.top_level()),
            root: self.options.root.clone(),
            mode: TraversalMode::TopLevel,
        });
        info!("Top-level snapshot created at {}", report.path.display());
        report
    }

    /// One artifact per non-excluded top-level directory, with paths
    /// relative to that directory.
    pub fn per_directory(&self) -> Vec<SnapshotReport> {
        let walker = Walker::new(Arc::clone(&self.rules), Arc::clone(&self.inclusion));
        walker
            .top_level_directories(&self.options.root)
            .into_iter()
            .map(|directory| {
                let name = directory
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let report = self.capture(&SnapshotTarget {
                    path: self.output_dir.join(self.naming.directory(&name)),
                    root: directory,
                    mode: TraversalMode::Recursive,
                });
                info!("Directory snapshot created at {}", report.path.display());
                report
            })
            .collect()
    }

    /// The listed files, in the order given.
    pub fn file_list(&self, listed: &[String]) -> SnapshotReport {
        let report = self.capture(&SnapshotTarget {
            path: self.output_dir.join(self.naming.file_list()),
            root: self.options.root.clone(),
            mode: TraversalMode::FileList(listed.to_vec()),
        });
        info!("Special snapshot created at {}", report.path.display());
        report
    }

    /// A full snapshot written to an explicit path.
    pub fn single(&self, output: Option<&Path>) -> SnapshotReport {
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.options.root.join(DEFAULT_SINGLE_OUTPUT));
        let report = self.capture(&SnapshotTarget {
            path,
            root: self.options.root.clone(),
            mode: TraversalMode::Recursive,
        });
        info!("Code snapshot created at {}", report.path.display());
        report
    }

    /// Runs the snapshots behind a menu selection, one after another.
    pub fn run(&self, selection: Selection, listed: &[String]) -> Vec<SnapshotReport> {
        match selection {
            Selection::AllSnapshots => {
                let mut reports = self.per_directory();
                reports.push(self.full());
                reports.push(self.top_level());
                reports
            }
            Selection::FullAndTopLevel => vec![self.full(), self.top_level()],
            Selection::FileList if listed.iter().all(|raw| raw.trim().is_empty()) => {
                info!("No file paths provided");
                Vec::new()
            }
            Selection::FileList => vec![self.file_list(listed)],
        }
    }
}
