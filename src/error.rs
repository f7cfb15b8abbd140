//! Error taxonomy for the validation gates.
//!
//! Each gate surfaces exactly one error shape: `Parse` for the roster,
//! `Format` for catalogs, `Build` for the documentation build and `Style`
//! for style violations. Gates never recover or retry; the runner maps any
//! error to a non-zero process exit after printing the diagnostics.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single problem found inside one catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    /// 1-based line the issue points at (0 when the issue is file-global)
    pub line: usize,
    pub message: String,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: {}", self.line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// All problems found in one catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFailure {
    pub path: PathBuf,
    pub issues: Vec<CatalogIssue>,
}

impl fmt::Display for CatalogFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", self.path.display(), issue)?;
        }
        Ok(())
    }
}

/// A single style-rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleViolation {
    pub path: PathBuf,
    /// 1-based line number (0 for whole-file rules such as a missing final newline)
    pub line: usize,
    /// Short rule identifier, e.g. `line-too-long`
    pub rule: &'static str,
    pub message: String,
}

impl fmt::Display for StyleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}:{}: [{}] {}",
                self.path.display(),
                self.line,
                self.rule,
                self.message
            )
        } else {
            write!(f, "{}: [{}] {}", self.path.display(), self.rule, self.message)
        }
    }
}

/// Failure of a validation gate.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The roster file is not well-formed YAML.
    #[error("{}:{}:{}: {}", .path.display(), .line, .column, .message)]
    Parse {
        path: PathBuf,
        /// 1-based line reported by the parser (0 when unknown)
        line: usize,
        /// 1-based column reported by the parser (0 when unknown)
        column: usize,
        message: String,
    },

    /// One or more catalog files are malformed.
    #[error("{} catalog file(s) failed format checks:\n{}", .failures.len(),
        .failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("\n"))]
    Format { failures: Vec<CatalogFailure> },

    /// The documentation build failed or emitted warnings.
    #[error("documentation build failed:\n{}", .diagnostics.join("\n"))]
    Build { diagnostics: Vec<String> },

    /// Style rules were violated somewhere in the tree.
    #[error("{} style violation(s):\n{}", .violations.len(),
        .violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n"))]
    Style { violations: Vec<StyleViolation> },

    /// Filesystem error while discovering or reading inputs.
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    /// Stable identifier of the error kind, used in gate summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Parse { .. } => "ParseError",
            CheckError::Format { .. } => "FormatError",
            CheckError::Build { .. } => "BuildError",
            CheckError::Style { .. } => "StyleError",
            CheckError::Io { .. } => "IoError",
        }
    }
}
