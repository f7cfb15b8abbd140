use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Runtime configuration for the validation gates and the Zanata client.
///
/// Everything is read from the environment with defaults matching the
/// layout of an OpenStack-style i18n repository; the CLI can override the
/// most common knobs afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the repository under validation
    pub repo_root: PathBuf,

    // Roster
    pub roster_file: PathBuf,

    // Documentation build
    pub docs_source_dir: PathBuf,
    pub docs_build_dir: PathBuf,
    pub docs_builder: String,
    pub docs_builder_args: Vec<String>,

    // Catalog discovery (glob patterns relative to the repo root)
    pub catalog_globs: Vec<String>,

    // Style checking
    pub style_globs: Vec<String>,
    pub max_line_length: usize,

    /// Optional override for the version-pinning constraints file consumed
    /// by the packaging step. Recorded here, not used by any gate.
    pub upper_constraints_file: Option<String>,

    // Zanata REST API
    pub zanata_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            repo_root: std::env::var("REPO_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),

            roster_file: std::env::var("ROSTER_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("tools/zanata/translation_team.yaml")),

            docs_source_dir: std::env::var("DOCS_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("doc/source")),
            docs_build_dir: std::env::var("DOCS_BUILD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("doc/build/html")),
            docs_builder: std::env::var("DOCS_BUILDER")
                .unwrap_or_else(|_| "sphinx-build".to_string()),
            docs_builder_args: std::env::var("DOCS_BUILDER_ARGS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| vec!["-W".to_string(), "-b".to_string(), "html".to_string()]),

            catalog_globs: std::env::var("CATALOG_GLOBS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| vec!["doc/**/*.po".to_string(), "doc/**/*.pot".to_string()]),

            style_globs: std::env::var("STYLE_GLOBS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| {
                    vec![
                        "doc/source/**/*.rst".to_string(),
                        "tools/**/*.py".to_string(),
                        "tools/**/*.sh".to_string(),
                    ]
                }),
            max_line_length: std::env::var("MAX_LINE_LENGTH")
                .ok()
                .map(|v| {
                    v.parse()
                        .with_context(|| format!("MAX_LINE_LENGTH is not a number: {}", v))
                })
                .transpose()?
                .unwrap_or(79),

            upper_constraints_file: std::env::var("UPPER_CONSTRAINTS_FILE").ok(),

            zanata_api_url: std::env::var("ZANATA_API_URL")
                .unwrap_or_else(|_| "https://translate.openstack.org/rest".to_string()),
        })
    }

    /// Repo-root joined path of the roster file.
    pub fn roster_path(&self) -> PathBuf {
        self.repo_root.join(&self.roster_file)
    }

    pub fn docs_source_path(&self) -> PathBuf {
        self.repo_root.join(&self.docs_source_dir)
    }

    pub fn docs_build_path(&self) -> PathBuf {
        self.repo_root.join(&self.docs_build_dir)
    }

    /// Expand a repo-relative glob pattern against the repo root.
    pub fn rooted_pattern(&self, pattern: &str) -> String {
        rooted(&self.repo_root, pattern)
    }
}

fn rooted(root: &Path, pattern: &str) -> String {
    if root == Path::new(".") || root.as_os_str().is_empty() {
        pattern.to_string()
    } else {
        format!("{}/{}", root.display(), pattern)
    }
}

/// Split a comma-separated env value, dropping empty segments.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
