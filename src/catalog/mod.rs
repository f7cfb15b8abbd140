//! Catalog format validation gate.
//!
//! Discovers every `.po`/`.pot` file matched by the configured glob
//! patterns and checks each one independently. Successful output is
//! discarded (debug log only); failures from all files are collected so a
//! single run reports everything at once.

mod format;
mod parser;

pub use format::{check_catalog, extract_tokens, CatalogKind, FormatToken};
pub use parser::{parse, Catalog, CatalogEntry};

use crate::config::Config;
use crate::error::{CatalogFailure, CheckError};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

/// Summary of a passing catalog gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogReport {
    pub files_checked: usize,
}

/// Discover catalog files for the configured globs, sorted and deduplicated.
pub fn discover(config: &Config) -> Result<Vec<PathBuf>, CheckError> {
    let mut files = BTreeSet::new();
    for pattern in &config.catalog_globs {
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

/// Validate every discovered catalog file.
pub fn check_catalogs(config: &Config) -> Result<CatalogReport, CheckError> {
    let files = discover(config)?;
    let mut failures: Vec<CatalogFailure> = Vec::new();

    for path in &files {
        let content = std::fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.clone(),
            source,
        })?;

        let kind = CatalogKind::from_path(path);
        match parse(&content) {
            Err(issue) => failures.push(CatalogFailure {
                path: path.clone(),
                issues: vec![issue],
            }),
            Ok(catalog) => {
                let issues = check_catalog(&catalog, kind);
                if issues.is_empty() {
                    debug!("catalog {} is clean ({:?})", path.display(), kind);
                } else {
                    failures.push(CatalogFailure {
                        path: path.clone(),
                        issues,
                    });
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(CatalogReport {
            files_checked: files.len(),
        })
    } else {
        Err(CheckError::Format { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> Config {
        let mut config = test_config();
        config.repo_root = root.to_path_buf();
        config
    }

    fn test_config() -> Config {
        Config {
            repo_root: PathBuf::from("."),
            roster_file: PathBuf::from("tools/zanata/translation_team.yaml"),
            docs_source_dir: PathBuf::from("doc/source"),
            docs_build_dir: PathBuf::from("doc/build/html"),
            docs_builder: "sphinx-build".to_string(),
            docs_builder_args: vec!["-W".to_string()],
            catalog_globs: vec!["doc/**/*.po".to_string(), "doc/**/*.pot".to_string()],
            style_globs: vec!["doc/source/**/*.rst".to_string()],
            max_line_length: 79,
            upper_constraints_file: None,
            zanata_api_url: "http://localhost".to_string(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    const GOOD_PO: &str = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\nmsgid \"Hello %s\"\nmsgstr \"Bonjour %s\"\n";
    const BAD_PO: &str = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\nmsgid \"Hello %s\"\nmsgstr \"Bonjour\"\n";

    #[test]
    fn test_check_catalogs_all_clean() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "doc/source/locale/fr/LC_MESSAGES/doc.po",
            GOOD_PO,
        );
        write(
            dir.path(),
            "doc/source/locale/doc.pot",
            "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=CHARSET\\n\"\n\nmsgid \"Hello %s\"\nmsgstr \"\"\n",
        );

        let report = check_catalogs(&config_for(dir.path())).unwrap();
        assert_eq!(report.files_checked, 2);
    }

    #[test]
    fn test_check_catalogs_reports_every_failing_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "doc/a/bad1.po", BAD_PO);
        write(dir.path(), "doc/b/bad2.po", "msgstr \"orphan\"\n");
        write(dir.path(), "doc/c/good.po", GOOD_PO);

        let err = check_catalogs(&config_for(dir.path())).unwrap_err();
        match err {
            CheckError::Format { failures } => {
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_catalogs_no_files_is_clean() {
        let dir = TempDir::new().unwrap();
        let report = check_catalogs(&config_for(dir.path())).unwrap();
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn test_discover_is_sorted_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "doc/z.po", GOOD_PO);
        write(dir.path(), "doc/a.po", GOOD_PO);

        let mut config = config_for(dir.path());
        // Overlapping patterns must not produce duplicates.
        config
            .catalog_globs
            .push("doc/*.po".to_string());

        let files = discover(&config).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("doc/a.po"));
        assert!(files[1].ends_with("doc/z.po"));
    }
}
