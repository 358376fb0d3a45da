//! Command-line interface for codesnap.
//!
//! Produces one or more snapshot files for a project root. Without `--mode`
//! the operator is asked which snapshots to create.

use clap::{Parser, ValueEnum};
use codesnap::logging::initialize_logger;
use codesnap::select::{parse_file_list, prompt_file_list, prompt_selection};
use codesnap::{
    Selection, SnapshotBuilder, SnapshotOptions, SnapshotReport, Snapshotter, TreeStyle,
};
use std::io;
use std::path::PathBuf;
use tracing::warn;

/// codesnap — concatenate a project's source files into snapshot files
#[derive(Parser)]
#[command(name = "codesnap", version, about, long_about = None)]
struct Cli {
    /// Project root (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Which snapshots to produce
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    mode: Mode,

    /// Files for `--mode files`, comma-separated and relative to the root
    #[arg(long)]
    files: Option<String>,

    /// Output path for `--mode single`
    #[arg(short, long, env = "OUTPUT_PATH")]
    output: Option<PathBuf>,

    /// JSON file overriding the default exclusion and inclusion lists
    #[arg(long)]
    config: Option<PathBuf>,

    /// How the directory structure header is rendered
    #[arg(long, value_enum)]
    tree: Option<TreeArg>,

    /// Print a JSON summary of the snapshots written
    #[arg(long)]
    json: bool,

    /// Log debug detail
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Ask on the console
    Interactive,
    /// Per-directory, full, and top-level snapshots
    All,
    /// Full and top-level snapshots
    Full,
    /// An explicit list of files
    Files,
    /// One full snapshot written to --output
    Single,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TreeArg {
    Command,
    Builtin,
    None,
}

impl From<TreeArg> for TreeStyle {
    fn from(arg: TreeArg) -> Self {
        match arg {
            TreeArg::Command => TreeStyle::Command,
            TreeArg::Builtin => TreeStyle::Builtin,
            TreeArg::None => TreeStyle::None,
        }
    }
}

impl Cli {
    fn options(&self) -> SnapshotOptions {
        let root = self.root.canonicalize().unwrap_or_else(|e| {
            warn!("Could not resolve {}: {}", self.root.display(), e);
            self.root.clone()
        });
        let loaded = match &self.config {
            Some(path) => SnapshotOptions::from_json_file(path).unwrap_or_else(|e| {
                warn!("{}. Using default settings.", e);
                SnapshotOptions::default()
            }),
            None => SnapshotOptions::default(),
        };
        let mut builder = SnapshotBuilder::from_options(root, loaded);
        if let Some(tree) = self.tree {
            builder = builder.tree(tree.into());
        }
        builder.build()
    }

    /// The `--files` entries, trimmed with blanks dropped.
    fn listed_files(&self) -> Option<Vec<String>> {
        self.files.as_deref().map(parse_file_list)
    }
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let snapshotter = Snapshotter::new(cli.options());
    let reports = match cli.mode {
        Mode::Interactive => run_interactive(&snapshotter),
        Mode::All => snapshotter.run(Selection::AllSnapshots, &[]),
        Mode::Full => snapshotter.run(Selection::FullAndTopLevel, &[]),
        Mode::Files => {
            let listed = cli.listed_files().unwrap_or_else(ask_file_list);
            run_file_list(&snapshotter, &listed)
        }
        Mode::Single => vec![snapshotter.single(cli.output.as_deref())],
    };

    if cli.json {
        print_summary(&reports);
    }
}

fn run_interactive(snapshotter: &Snapshotter) -> Vec<SnapshotReport> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let selection = prompt_selection(&mut input, &mut stdout).unwrap_or_else(|e| {
        warn!("Error reading selection: {}", e);
        Selection::AllSnapshots
    });
    if selection != Selection::FileList {
        return snapshotter.run(selection, &[]);
    }
    let listed = prompt_file_list(&mut input, &mut stdout).unwrap_or_else(|e| {
        warn!("Error reading file list: {}", e);
        Vec::new()
    });
    run_file_list(snapshotter, &listed)
}

fn ask_file_list() -> Vec<String> {
    let stdin = io::stdin();
    prompt_file_list(&mut stdin.lock(), &mut io::stdout()).unwrap_or_else(|e| {
        warn!("Error reading file list: {}", e);
        Vec::new()
    })
}

fn run_file_list(snapshotter: &Snapshotter, listed: &[String]) -> Vec<SnapshotReport> {
    if listed.is_empty() {
        println!("No file paths provided. Exiting.");
        return Vec::new();
    }
    snapshotter.run(Selection::FileList, listed)
}

fn print_summary(reports: &[SnapshotReport]) {
    match serde_json::to_string_pretty(reports) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("JSON serialization error: {}", e),
    }
}
