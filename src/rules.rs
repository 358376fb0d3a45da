//! Exclusion and inclusion rules applied to project-relative paths.
//!
//! Paths handed to these rules are always relative to a snapshot's base root
//! and use `/` as the separator.

use crate::error::SnapshotError;
use crate::options::SnapshotOptions;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Reads an ignore file, keeping every non-blank line that is not a `#` comment.
///
/// A missing or unreadable file yields no patterns.
pub fn load_ignore_patterns(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let patterns: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from)
                .collect();
            info!("Added {} exclusions from {}", patterns.len(), path.display());
            patterns
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No {} file found", display_name(path));
            Vec::new()
        }
        Err(e) => {
            warn!("Error reading {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone)]
enum IgnorePattern {
    /// Matches the path itself or anything beneath it.
    Literal(String),
    /// `*` matches any run of characters, `/` included.
    Wildcard(Regex),
}

impl IgnorePattern {
    fn compile(raw: &str) -> Result<Option<Self>, SnapshotError> {
        let trimmed = raw.trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(None);
        }
        if !trimmed.contains('*') {
            return Ok(Some(IgnorePattern::Literal(trimmed.to_string())));
        }
        let body = trimmed
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Regex::new(&format!("^{}$", body))
            .map(|re| Some(IgnorePattern::Wildcard(re)))
            .map_err(|source| SnapshotError::Pattern {
                pattern: raw.to_string(),
                source,
            })
    }

    fn matches(&self, relative: &str) -> bool {
        match self {
            IgnorePattern::Literal(literal) => {
                relative == literal
                    || relative
                        .strip_prefix(literal.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            IgnorePattern::Wildcard(re) => re.is_match(relative),
        }
    }
}

/// Fixed directory/file exclusions plus the patterns loaded from an ignore file.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    dir_prefixes: Vec<String>,
    file_suffixes: Vec<String>,
    patterns: Vec<IgnorePattern>,
}

impl ExclusionRules {
    pub fn new(dir_prefixes: Vec<String>, file_suffixes: Vec<String>, patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| match IgnorePattern::compile(raw) {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect();
        Self {
            dir_prefixes,
            file_suffixes,
            patterns,
        }
    }

    /// Fixed lists from `options`, patterns from its ignore file.
    pub fn from_options(options: &SnapshotOptions) -> Self {
        let patterns = load_ignore_patterns(&options.ignore_file_path());
        Self::new(
            options.exclude_dirs.clone(),
            options.exclude_files.clone(),
            &patterns,
        )
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Directory names match as plain string prefixes, so `node_modules`
    /// also excludes `node_modules-backup`.
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.dir_prefixes
            .iter()
            .any(|dir| relative.starts_with(dir.as_str()))
            || self
                .file_suffixes
                .iter()
                .any(|file| relative.ends_with(file.as_str()))
            || self.patterns.iter().any(|p| p.matches(relative))
    }
}

/// Extension allow-list. Case-sensitive suffix match.
#[derive(Debug, Clone, Default)]
pub struct InclusionFilter {
    extensions: Vec<String>,
}

impl InclusionFilter {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    pub fn is_included(&self, path: &str) -> bool {
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}
