use codesnap::{
    Selection, SnapshotBuilder, SnapshotError, SnapshotNaming, SnapshotOptions, Snapshotter,
    TreeRenderer, TreeStyle,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use tracing_test::traced_test;

struct FixedTree(&'static str);
impl TreeRenderer for FixedTree {
    fn render(&self, _directory: &Path, _excluded: &[String]) -> Result<String, SnapshotError> {
        Ok(self.0.to_string())
    }
}

struct FailingTree;
impl TreeRenderer for FailingTree {
    fn render(&self, _directory: &Path, _excluded: &[String]) -> Result<String, SnapshotError> {
        Err(SnapshotError::TreeCommand("tree: not installed".into()))
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ts", "export const a = 1;\n");
    write(dir.path(), "secret.env", "API_KEY=hunter2\n");
    write(dir.path(), "node_modules/pkg/index.js", "module.exports = {};\n");
    write(dir.path(), "notes.md", "# Notes\n\nNo trailing newline");
    dir
}

fn snapshotter(options: SnapshotOptions) -> Snapshotter {
    Snapshotter::new(options)
        .with_renderer(Box::new(FixedTree(".\n└── a.ts\n")))
        .with_naming(SnapshotNaming::for_date("20240131"))
}

fn section_names(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter(|l| l.starts_with("--- ") && l.ends_with(" ---"))
        .filter(|l| *l != "--- Project Directory Structure ---")
        .map(|l| l.trim_start_matches("--- ").trim_end_matches(" ---").to_string())
        .collect()
}

#[test]
fn full_snapshot_captures_only_eligible_files() {
    let dir = project();
    let report = snapshotter(SnapshotBuilder::new(dir.path()).build()).full();

    assert_eq!(
        report.path,
        dir.path().join("20240131-allfiles-code_snapshot.txt")
    );
    let output = fs::read_to_string(&report.path).unwrap();
    assert!(output.starts_with(
        "--- Project Directory Structure ---\nCurrent directory: ./\n.\n└── a.ts\n\n"
    ));
    let names = section_names(&output);
    assert_eq!(
        names,
        BTreeSet::from(["a.ts".to_string(), "notes.md".to_string()])
    );
    assert!(!output.contains("hunter2"));
    assert!(!output.contains("module.exports"));
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.errors, 0);
}

#[test]
fn sections_reproduce_file_contents() {
    let dir = project();
    write(dir.path(), "src/deep/util.ts", "export function f() {\r\n  return 'ü';\r\n}");
    let report = snapshotter(SnapshotBuilder::new(dir.path()).build()).full();
    let output = fs::read(&report.path).unwrap();

    let mut rebuilt = Vec::new();
    for (i, name) in report.files.iter().enumerate() {
        let marker = format!("\n--- {} ---\n", name);
        let start = find(&output, marker.as_bytes()).unwrap() + marker.len();
        let end = report
            .files
            .get(i + 1)
            .map(|next| find(&output, format!("\n--- {} ---\n", next).as_bytes()).unwrap())
            .unwrap_or(output.len());
        assert_eq!(&output[start..end], fs::read(dir.path().join(name)).unwrap());
        rebuilt.push(name.clone());
    }
    assert_eq!(rebuilt.len(), 3);
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = project();
    write(dir.path(), "src/index.tsx", "<App />\n");
    let options = SnapshotBuilder::new(dir.path())
        .tree(TreeStyle::Builtin)
        .build();
    let snapshotter = Snapshotter::new(options).with_naming(SnapshotNaming::for_date("20240131"));

    let first = fs::read(snapshotter.full().path).unwrap();
    let second = fs::read(snapshotter.full().path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn gitignore_patterns_apply() {
    let dir = project();
    write(dir.path(), ".gitignore", "# build output\nbuild/\n*.log\n\n");
    write(dir.path(), "build/x.ts", "built");
    write(dir.path(), "app.log.ts", "log-like");
    write(dir.path(), "app.log", "log");
    write(dir.path(), "app.ts", "app");

    let snapshotter = snapshotter(SnapshotBuilder::new(dir.path()).build());
    assert!(snapshotter.rules().is_excluded("build/x.ts"));
    assert!(snapshotter.rules().is_excluded("app.log"));
    assert!(!snapshotter.rules().is_excluded("app.ts"));

    let output = fs::read_to_string(snapshotter.full().path).unwrap();
    let names = section_names(&output);
    assert!(names.contains("app.ts"));
    assert!(names.contains("app.log.ts"));
    assert!(!names.contains("build/x.ts"));
}

#[test]
fn top_level_snapshot_does_not_recurse() {
    let dir = project();
    write(dir.path(), "src/index.ts", "nested");
    let report = snapshotter(SnapshotBuilder::new(dir.path()).build()).top_level();

    assert_eq!(report.path, dir.path().join("20240131-code_snapshot.txt"));
    let names = section_names(&fs::read_to_string(&report.path).unwrap());
    assert_eq!(
        names,
        BTreeSet::from(["a.ts".to_string(), "notes.md".to_string()])
    );
}

#[test]
fn per_directory_snapshots_are_relative_to_each_directory() {
    let dir = project();
    write(dir.path(), "src/components/Button.tsx", "button");
    write(dir.path(), "lib/db.ts", "db");
    write(dir.path(), ".git/HEAD.ts", "ref");

    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build()).per_directory();
    let mut paths: Vec<_> = reports
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "20240131-lib-code_snapshot.txt",
            "20240131-src-code_snapshot.txt"
        ]
    );

    let src = fs::read_to_string(dir.path().join("20240131-src-code_snapshot.txt")).unwrap();
    assert!(src.starts_with("--- Project Directory Structure ---\nCurrent directory: src/\n"));
    assert_eq!(
        section_names(&src),
        BTreeSet::from(["components/Button.tsx".to_string()])
    );
}

#[test]
#[traced_test]
fn file_list_skips_each_invalid_entry() {
    let dir = project();
    let listed = vec![
        "a.ts".to_string(),
        "missing.ts".to_string(),
        "secret.env".to_string(),
    ];
    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build())
        .run(Selection::FileList, &listed);

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(
        report.path,
        dir.path().join("special-code-snapshot-20240131.txt")
    );
    assert_eq!(report.files, vec!["a.ts"]);
    assert_eq!(report.skipped, 2);
    let output = fs::read_to_string(&report.path).unwrap();
    assert_eq!(section_names(&output), BTreeSet::from(["a.ts".to_string()]));
    assert!(logs_contain("Skipping file: missing.ts (does not exist)"));
    assert!(logs_contain("Skipping file: secret.env (excluded)"));
}

#[test]
fn tree_failure_writes_placeholder_and_continues() {
    let dir = project();
    let report = Snapshotter::new(SnapshotBuilder::new(dir.path()).build())
        .with_renderer(Box::new(FailingTree))
        .with_naming(SnapshotNaming::for_date("20240131"))
        .full();

    let output = fs::read_to_string(&report.path).unwrap();
    assert!(output.starts_with(
        "--- Project Directory Structure ---\nError generating tree output\n\n\n--- "
    ));
    assert!(report.tree_failed);
    assert_eq!(report.files.len(), 2);
}

#[test]
fn output_goes_to_docs_when_present() {
    let dir = project();
    fs::create_dir(dir.path().join("docs")).unwrap();
    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build())
        .run(Selection::FullAndTopLevel, &[]);

    assert_eq!(reports.len(), 2);
    assert!(dir.path().join("docs/20240131-allfiles-code_snapshot.txt").is_file());
    assert!(dir.path().join("docs/20240131-code_snapshot.txt").is_file());
}

#[test]
fn single_snapshot_with_empty_tree_listing() {
    let dir = project();
    let out = dir.path().join("out/snapshot.txt");
    let options = SnapshotBuilder::new(dir.path())
        .tree(TreeStyle::None)
        .build();
    let report = Snapshotter::new(options).single(Some(out.as_path()));

    assert_eq!(report.path, out);
    let output = fs::read_to_string(&out).unwrap();
    assert!(output.starts_with(
        "--- Project Directory Structure ---\nCurrent directory: ./\n\n\n--- "
    ));
    assert_eq!(
        section_names(&output),
        BTreeSet::from(["a.ts".to_string(), "notes.md".to_string()])
    );
}

#[test]
fn single_snapshot_defaults_to_root() {
    let dir = project();
    let options = SnapshotBuilder::new(dir.path())
        .tree(TreeStyle::None)
        .build();
    let report = Snapshotter::new(options).single(None);
    assert_eq!(report.path, dir.path().join("code_snapshot.txt"));
    assert!(report.path.is_file());
}

#[test]
fn empty_file_list_writes_nothing() {
    let dir = project();
    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build())
        .run(Selection::FileList, &[]);
    assert!(reports.is_empty());
    assert!(!dir.path().join("special-code-snapshot-20240131.txt").exists());

    let blank = vec![" ".to_string(), String::new()];
    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build())
        .run(Selection::FileList, &blank);
    assert!(reports.is_empty());
    assert!(!dir.path().join("special-code-snapshot-20240131.txt").exists());
}

#[test]
fn file_list_entries_are_trimmed() {
    let dir = project();
    let listed = vec![" a.ts".to_string(), "notes.md ".to_string()];
    let reports = snapshotter(SnapshotBuilder::new(dir.path()).build())
        .run(Selection::FileList, &listed);
    assert_eq!(reports[0].files, vec!["a.ts", "notes.md"]);
    assert_eq!(reports[0].skipped, 0);
}
