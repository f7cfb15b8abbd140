//! Style rules over the repository's text and script sources.
//!
//! Four fixed rules, applied line by line: maximum line length, trailing
//! whitespace, tab indentation, and a required final newline. Every
//! violation is collected before the gate fails so one run reports the
//! full set.

use crate::config::Config;
use crate::error::{CheckError, StyleViolation};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RULE_LINE_TOO_LONG: &str = "line-too-long";
pub const RULE_TRAILING_WHITESPACE: &str = "trailing-whitespace";
pub const RULE_TAB_INDENTATION: &str = "tab-indentation";
pub const RULE_MISSING_FINAL_NEWLINE: &str = "missing-final-newline";

/// Summary of a passing style gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleReport {
    pub files_checked: usize,
}

/// Discover style-checked files for the configured globs.
pub fn discover(config: &Config) -> Result<Vec<PathBuf>, CheckError> {
    let mut files = BTreeSet::new();
    for pattern in &config.style_globs {
        let rooted = config.rooted_pattern(pattern);
        let paths = glob::glob(&rooted).map_err(|e| CheckError::Io {
            path: PathBuf::from(&rooted),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                CheckError::Io {
                    path,
                    source: e.into_error(),
                }
            })?;
            if path.is_file() {
                files.insert(path);
            }
        }
    }
    Ok(files.into_iter().collect())
}

/// Check one file's content against the style rules.
pub fn check_content(path: &Path, content: &str, max_line_length: usize) -> Vec<StyleViolation> {
    let mut violations = Vec::new();
    let line_count = content.split('\n').count();

    for (idx, line) in content.split('\n').enumerate() {
        let line_no = idx + 1;

        // The final fragment after the last newline is not a line.
        if idx + 1 == line_count && line.is_empty() {
            continue;
        }

        let length = line.chars().count();
        if length > max_line_length {
            violations.push(StyleViolation {
                path: path.to_path_buf(),
                line: line_no,
                rule: RULE_LINE_TOO_LONG,
                message: format!(
                    "line is {} characters long (limit {})",
                    length, max_line_length
                ),
            });
        }

        if line.ends_with(' ') || line.ends_with('\t') || line.ends_with('\r') {
            violations.push(StyleViolation {
                path: path.to_path_buf(),
                line: line_no,
                rule: RULE_TRAILING_WHITESPACE,
                message: "trailing whitespace".to_string(),
            });
        }

        if leading_whitespace_has_tab(line) {
            violations.push(StyleViolation {
                path: path.to_path_buf(),
                line: line_no,
                rule: RULE_TAB_INDENTATION,
                message: "tab character in indentation".to_string(),
            });
        }
    }

    if !content.is_empty() && !content.ends_with('\n') {
        violations.push(StyleViolation {
            path: path.to_path_buf(),
            line: 0,
            rule: RULE_MISSING_FINAL_NEWLINE,
            message: "file does not end with a newline".to_string(),
        });
    }

    violations
}

fn leading_whitespace_has_tab(line: &str) -> bool {
    for c in line.chars() {
        match c {
            '\t' => return true,
            ' ' => continue,
            _ => return false,
        }
    }
    false
}

/// Run the style gate over every discovered file.
pub fn check_style(config: &Config) -> Result<StyleReport, CheckError> {
    let files = discover(config)?;
    let mut violations = Vec::new();

    for path in &files {
        let bytes = std::fs::read(path).map_err(|source| CheckError::Io {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let found = check_content(path, &content, config.max_line_length);
        if found.is_empty() {
            debug!("style: {} is clean", path.display());
        }
        violations.extend(found);
    }

    if violations.is_empty() {
        Ok(StyleReport {
            files_checked: files.len(),
        })
    } else {
        Err(CheckError::Style { violations })
    }
}
