//! Translation-team roster handling.
//!
//! The roster is a YAML document mapping language codes to team metadata
//! (coordinators, reviewers, translators). The validation gate only cares
//! that the file is well-formed YAML; the stats tool additionally needs the
//! typed model to know which users belong to which language team.

use crate::error::CheckError;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One language team as declared in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTeam {
    /// Language code used as the roster key (e.g. "ja", "zh-CN")
    pub language_code: String,
    /// Human-readable language name
    pub language: String,
    pub translators: Vec<String>,
    pub reviewers: Vec<String>,
    pub coordinators: Vec<String>,
}

/// A Zanata user id. An id consisting only of digits is valid in Zanata and
/// parses as an integer unless quoted in the YAML file, so both forms are
/// accepted and normalized to strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UserId {
    Text(String),
    Number(i64),
}

impl UserId {
    fn into_string(self) -> String {
        match self {
            UserId::Text(s) => s,
            UserId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    language: String,
    #[serde(default)]
    translators: Vec<UserId>,
    #[serde(default)]
    reviewers: Vec<UserId>,
    #[serde(default)]
    coordinators: Vec<UserId>,
}

/// Syntax-only validation of the roster file.
///
/// Succeeds silently for any well-formed YAML document; no keys or types
/// are checked. On a syntax error the parser's line/column location is
/// surfaced in the returned [`CheckError::Parse`].
pub fn check_syntax(path: &Path) -> Result<(), CheckError> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_yaml::from_str::<serde_yaml::Value>(&content) {
        Ok(_) => {
            debug!("roster {} is well-formed YAML", path.display());
            Ok(())
        }
        Err(err) => {
            let location = err.location();
            Err(CheckError::Parse {
                path: path.to_path_buf(),
                line: location.as_ref().map(|l| l.line()).unwrap_or(0),
                column: location.as_ref().map(|l| l.column()).unwrap_or(0),
                message: err.to_string(),
            })
        }
    }
}

/// Load the typed roster, optionally filtered to a list of language codes.
///
/// Unknown codes in the filter are an error naming every missing code, so a
/// typo in `--lang` does not silently produce an empty report.
pub fn load(path: &Path, lang_filter: &[String]) -> Result<Vec<LanguageTeam>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;

    let raw: BTreeMap<String, RawTeam> = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse roster {}", path.display()))?;

    if !lang_filter.is_empty() {
        let missing: Vec<&str> = lang_filter
            .iter()
            .filter(|code| !raw.contains_key(code.as_str()))
            .map(|code| code.as_str())
            .collect();
        if !missing.is_empty() {
            bail!(
                "language {} not found in {}",
                missing.join(", "),
                path.display()
            );
        }
    }

    let teams = raw
        .into_iter()
        .filter(|(code, _)| lang_filter.is_empty() || lang_filter.iter().any(|l| l == code))
        .map(|(code, team)| LanguageTeam {
            language_code: code,
            language: team.language,
            translators: team.translators.into_iter().map(UserId::into_string).collect(),
            reviewers: team.reviewers.into_iter().map(UserId::into_string).collect(),
            coordinators: team
                .coordinators
                .into_iter()
                .map(UserId::into_string)
                .collect(),
        })
        .collect();

    Ok(teams)
}
