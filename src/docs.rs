//! Documentation build gate.
//!
//! Renders the docs tree by invoking the configured builder command
//! (sphinx-build by default) with warnings promoted to errors. The build is
//! an external-collaborator boundary: this gate owns spawning the process,
//! scanning its output for diagnostics, and mapping the result onto the
//! error taxonomy. The command is configurable so tests can substitute a
//! stub builder.

use crate::config::Config;
use crate::error::CheckError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Output lines with any of these markers are treated as diagnostics.
const DIAGNOSTIC_MARKERS: &[&str] = &["WARNING:", "ERROR:", "CRITICAL:", "SEVERE:"];

/// How many trailing output lines to surface when a build fails without
/// emitting recognizable diagnostic lines.
const FALLBACK_TAIL_LINES: usize = 20;

/// Summary of a passing docs gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub command: String,
}

/// Invocation of the external documentation builder.
#[derive(Debug, Clone)]
pub struct DocsBuilder {
    command: String,
    args: Vec<String>,
    source_dir: PathBuf,
    build_dir: PathBuf,
}

impl DocsBuilder {
    pub fn from_config(config: &Config) -> Self {
        Self {
            command: config.docs_builder.clone(),
            args: config.docs_builder_args.clone(),
            source_dir: config.docs_source_path(),
            build_dir: config.docs_build_path(),
        }
    }

    pub fn new(command: &str, args: &[&str], source_dir: PathBuf, build_dir: PathBuf) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            source_dir,
            build_dir,
        }
    }

    fn command_line(&self) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(self.source_dir.display().to_string());
        parts.push(self.build_dir.display().to_string());
        parts.join(" ")
    }

    /// Run the build, treating any diagnostic line or non-zero exit as
    /// fatal.
    pub async fn build(&self) -> Result<BuildReport, CheckError> {
        let command_line = self.command_line();
        info!("building docs: {}", command_line);

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&self.source_dir)
            .arg(&self.build_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CheckError::Build {
                diagnostics: vec![format!(
                    "failed to run documentation builder '{}': {}",
                    self.command, e
                )],
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut diagnostics: Vec<String> = stdout
            .lines()
            .chain(stderr.lines())
            .filter(|line| DIAGNOSTIC_MARKERS.iter().any(|m| line.contains(m)))
            .map(|line| line.trim().to_string())
            .collect();

        if !output.status.success() && diagnostics.is_empty() {
            // Surface the tail of stderr so the operator sees something.
            let tail: Vec<String> = stderr
                .lines()
                .rev()
                .take(FALLBACK_TAIL_LINES)
                .map(|l| l.to_string())
                .collect();
            diagnostics.push(format!(
                "builder exited with {} and no diagnostic output",
                output.status
            ));
            diagnostics.extend(tail.into_iter().rev());
        }

        if !output.status.success() || !diagnostics.is_empty() {
            return Err(CheckError::Build { diagnostics });
        }

        debug!("docs build succeeded: {}", command_line);
        Ok(BuildReport {
            command: command_line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write an executable stub builder script and return its path.
    fn stub_builder(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("stub-builder.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn builder_with(dir: &TempDir, script: &PathBuf) -> DocsBuilder {
        DocsBuilder::new(
            script.to_str().unwrap(),
            &[],
            dir.path().join("doc/source"),
            dir.path().join("doc/build/html"),
        )
    }

    #[tokio::test]
    async fn test_successful_build() {
        let dir = TempDir::new().unwrap();
        let script = stub_builder(&dir, "echo 'build succeeded.'");

        let report = builder_with(&dir, &script).build().await.unwrap();
        assert!(report.command.contains("doc/source"));
    }

    #[tokio::test]
    async fn test_warning_fails_even_with_zero_exit() {
        let dir = TempDir::new().unwrap();
        let script = stub_builder(
            &dir,
            "echo 'index.rst:4: WARNING: undefined label: missing-ref' >&2; exit 0",
        );

        let err = builder_with(&dir, &script).build().await.unwrap_err();
        match err {
            CheckError::Build { diagnostics } => {
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].contains("undefined label"));
            }
            other => panic!("expected Build error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_diagnostics() {
        let dir = TempDir::new().unwrap();
        let script = stub_builder(&dir, "echo 'something odd' >&2; exit 2");

        let err = builder_with(&dir, &script).build().await.unwrap_err();
        match err {
            CheckError::Build { diagnostics } => {
                assert!(diagnostics[0].contains("exited with"));
                assert!(diagnostics.iter().any(|d| d.contains("something odd")));
            }
            other => panic!("expected Build error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_builder_is_a_build_error() {
        let builder = DocsBuilder::new(
            "/nonexistent/sphinx-build",
            &["-W"],
            PathBuf::from("doc/source"),
            PathBuf::from("doc/build/html"),
        );

        let err = builder.build().await.unwrap_err();
        match err {
            CheckError::Build { diagnostics } => {
                assert!(diagnostics[0].contains("failed to run"));
            }
            other => panic!("expected Build error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_warnings_all_reported() {
        let dir = TempDir::new().unwrap();
        let script = stub_builder(
            &dir,
            "echo 'a.rst:1: WARNING: first'; echo 'b.rst:2: WARNING: second' >&2; exit 1",
        );

        let err = builder_with(&dir, &script).build().await.unwrap_err();
        match err {
            CheckError::Build { diagnostics } => {
                assert_eq!(diagnostics.len(), 2);
            }
            other => panic!("expected Build error, got {:?}", other),
        }
    }

    #[test]
    fn test_command_line_rendering() {
        let builder = DocsBuilder::new(
            "sphinx-build",
            &["-W", "-b", "html"],
            PathBuf::from("doc/source"),
            PathBuf::from("doc/build/html"),
        );
        assert_eq!(
            builder.command_line(),
            "sphinx-build -W -b html doc/source doc/build/html"
        );
    }
}
