//! Operator prompts for choosing which snapshots to produce.

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use tracing::warn;

pub const SELECTION_PROMPT: &str = "Select snapshot type:\n\
1. All files by directory + full snapshot + top-level snapshot\n\
2. Only full snapshot + top-level snapshot\n\
3. Special list of files\n\
Enter 1, 2, 3, or press Enter for 1: ";

pub const FILE_LIST_PROMPT: &str = "Enter file paths (comma-separated, relative to project root): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Per-directory snapshots, then the full and top-level snapshots.
    AllSnapshots,
    FullAndTopLevel,
    /// An operator-supplied list of files.
    FileList,
}

impl Selection {
    /// Maps a menu answer to a selection. Anything unrecognized falls back to
    /// [`Selection::AllSnapshots`].
    pub fn parse(answer: &str) -> Self {
        match answer.trim() {
            "" | "1" => Selection::AllSnapshots,
            "2" => Selection::FullAndTopLevel,
            "3" => Selection::FileList,
            other => {
                warn!("Invalid input '{}'. Creating all snapshots.", other);
                Selection::AllSnapshots
            }
        }
    }
}

/// Splits a comma-separated answer into trimmed, non-empty paths.
pub fn parse_file_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    output.write_all(prompt.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Shows the snapshot menu and reads one answer. End of input counts as
/// pressing Enter.
pub fn prompt_selection<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Selection> {
    ask(input, output, SELECTION_PROMPT).map(|answer| Selection::parse(&answer))
}

pub fn prompt_file_list<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Vec<String>> {
    ask(input, output, FILE_LIST_PROMPT).map(|answer| parse_file_list(&answer))
}
