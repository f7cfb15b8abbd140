//! Format rules applied to parsed catalogs.
//!
//! The checks mirror what a release gate cares about: a usable header,
//! plural forms consistent with the header declaration, and printf-style
//! placeholder parity between each msgid and its translations. Templates
//! (`.pot`) are exempt from translation-side checks since their msgstr
//! sections are empty by construction.

use super::parser::{Catalog, CatalogEntry};
use crate::error::CatalogIssue;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Whether a file is a translated catalog or an untranslated template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Translation,
    Template,
}

impl CatalogKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("pot") => CatalogKind::Template,
            _ => CatalogKind::Translation,
        }
    }
}

/// A printf-style placeholder found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatToken {
    /// `%(name)s`: named, order-insensitive
    Named(String),
    /// `%s`, `%d`, ...: positional, order matters; the char is the
    /// conversion type
    Positional(char),
}

impl std::fmt::Display for FormatToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatToken::Named(name) => write!(f, "%({}){}", name, 's'),
            FormatToken::Positional(conv) => write!(f, "%{}", conv),
        }
    }
}

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"%(?:\(([A-Za-z0-9_]+)\))?[-#0 +']*(?:\d+|\*)?(?:\.(?:\d+|\*))?[hlLqjzt]*([diouxXeEfFgGcrs%])")
            .unwrap()
    })
}

/// Extract all placeholders from a message. `%%` escapes are skipped.
pub fn extract_tokens(text: &str) -> Vec<FormatToken> {
    token_regex()
        .captures_iter(text)
        .filter_map(|cap| {
            let conversion = cap.get(2)?.as_str().chars().next()?;
            if conversion == '%' {
                return None;
            }
            match cap.get(1) {
                Some(name) => Some(FormatToken::Named(name.as_str().to_string())),
                None => Some(FormatToken::Positional(conversion)),
            }
        })
        .collect()
}

/// Run every format rule against a parsed catalog, collecting all issues.
pub fn check_catalog(catalog: &Catalog, kind: CatalogKind) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();

    check_header(catalog, kind, &mut issues);
    check_duplicates(catalog, &mut issues);
    check_plural_forms(catalog, kind, &mut issues);
    if kind == CatalogKind::Translation {
        check_placeholders(catalog, &mut issues);
    }

    issues
}

fn check_header(catalog: &Catalog, kind: CatalogKind, issues: &mut Vec<CatalogIssue>) {
    if catalog.header().is_none() {
        issues.push(CatalogIssue {
            line: 0,
            message: "missing header entry (empty msgid)".to_string(),
        });
        return;
    }

    let fields = catalog.header_fields();
    match fields.get("Content-Type") {
        None => issues.push(CatalogIssue {
            line: 0,
            message: "header lacks a Content-Type field".to_string(),
        }),
        Some(content_type) => {
            if !content_type.contains("charset=") {
                issues.push(CatalogIssue {
                    line: 0,
                    message: "header Content-Type declares no charset".to_string(),
                });
            } else if kind == CatalogKind::Translation && content_type.contains("charset=CHARSET") {
                issues.push(CatalogIssue {
                    line: 0,
                    message: "header charset is the CHARSET template placeholder".to_string(),
                });
            }
        }
    }
}

fn check_duplicates(catalog: &Catalog, issues: &mut Vec<CatalogIssue>) {
    let mut seen: HashSet<(Option<&str>, &str)> = HashSet::new();
    for entry in catalog.entries.iter().filter(|e| !e.is_header()) {
        let key = (entry.msgctxt.as_deref(), entry.msgid.as_str());
        if !seen.insert(key) {
            issues.push(CatalogIssue {
                line: entry.line,
                message: format!("duplicate message definition '{}'", elide(&entry.msgid)),
            });
        }
    }
}

fn check_plural_forms(catalog: &Catalog, kind: CatalogKind, issues: &mut Vec<CatalogIssue>) {
    let plural_entries: Vec<&CatalogEntry> = catalog
        .entries
        .iter()
        .filter(|e| e.msgid_plural.is_some())
        .collect();
    if plural_entries.is_empty() {
        return;
    }

    let fields = catalog.header_fields();
    let nplurals = fields.get("Plural-Forms").and_then(|v| parse_nplurals(v));

    let nplurals = match nplurals {
        Some(n) => n,
        None => {
            // POT templates ship the "nplurals=INTEGER" placeholder.
            if kind == CatalogKind::Translation {
                issues.push(CatalogIssue {
                    line: 0,
                    message: "plural messages present but header Plural-Forms declares no nplurals"
                        .to_string(),
                });
            }
            return;
        }
    };

    if kind == CatalogKind::Template {
        return;
    }

    for entry in plural_entries {
        if entry.is_untranslated() {
            continue;
        }
        if entry.msgstr.len() != nplurals {
            issues.push(CatalogIssue {
                line: entry.line,
                message: format!(
                    "message has {} plural form(s) but header declares nplurals={}",
                    entry.msgstr.len(),
                    nplurals
                ),
            });
        }
    }
}

fn parse_nplurals(plural_forms: &str) -> Option<usize> {
    static NPLURALS_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        NPLURALS_REGEX.get_or_init(|| Regex::new(r"nplurals\s*=\s*(\d+)").unwrap());
    regex
        .captures(plural_forms)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn check_placeholders(catalog: &Catalog, issues: &mut Vec<CatalogIssue>) {
    for entry in catalog.entries.iter().filter(|e| !e.is_header()) {
        // Untranslated and fuzzy entries are not format errors; msgfmt
        // skips them the same way.
        if entry.is_untranslated() || entry.has_flag("fuzzy") {
            continue;
        }

        match &entry.msgid_plural {
            None => check_singular_placeholders(entry, issues),
            Some(plural) => check_plural_placeholders(entry, plural, issues),
        }
    }
}

fn check_singular_placeholders(entry: &CatalogEntry, issues: &mut Vec<CatalogIssue>) {
    let expected = extract_tokens(&entry.msgid);
    let found = extract_tokens(&entry.msgstr[0]);

    if !tokens_match(&expected, &found) {
        issues.push(CatalogIssue {
            line: entry.line,
            message: format!(
                "placeholder mismatch: msgid has [{}] but msgstr has [{}]",
                describe(&expected),
                describe(&found)
            ),
        });
    }
}

fn check_plural_placeholders(
    entry: &CatalogEntry,
    plural: &str,
    issues: &mut Vec<CatalogIssue>,
) {
    let singular_tokens = extract_tokens(&entry.msgid);
    let plural_tokens = extract_tokens(plural);
    let allowed_names: HashSet<&FormatToken> = singular_tokens
        .iter()
        .chain(plural_tokens.iter())
        .filter(|t| matches!(t, FormatToken::Named(_)))
        .collect();

    for (index, form) in entry.msgstr.iter().enumerate() {
        if form.is_empty() {
            continue;
        }
        let found = extract_tokens(form);

        // A translated form may follow either the singular or the plural
        // source shape (languages with one plural class use the singular).
        let positional_ok = positional_of(&found) == positional_of(&singular_tokens)
            || positional_of(&found) == positional_of(&plural_tokens);
        let names_ok = found
            .iter()
            .filter(|t| matches!(t, FormatToken::Named(_)))
            .all(|t| allowed_names.contains(t));

        if !positional_ok || !names_ok {
            issues.push(CatalogIssue {
                line: entry.line,
                message: format!(
                    "placeholder mismatch in msgstr[{}]: expected [{}] or [{}], found [{}]",
                    index,
                    describe(&singular_tokens),
                    describe(&plural_tokens),
                    describe(&found)
                ),
            });
        }
    }
}

/// Positional tokens must match as an ordered sequence; named tokens must
/// match as a set (they can be reordered and repeated by the translation).
fn tokens_match(expected: &[FormatToken], found: &[FormatToken]) -> bool {
    if positional_of(expected) != positional_of(found) {
        return false;
    }
    let expected_names: HashSet<&FormatToken> = expected
        .iter()
        .filter(|t| matches!(t, FormatToken::Named(_)))
        .collect();
    let found_names: HashSet<&FormatToken> = found
        .iter()
        .filter(|t| matches!(t, FormatToken::Named(_)))
        .collect();
    expected_names == found_names
}

fn positional_of(tokens: &[FormatToken]) -> Vec<char> {
    tokens
        .iter()
        .filter_map(|t| match t {
            FormatToken::Positional(c) => Some(*c),
            FormatToken::Named(_) => None,
        })
        .collect()
}

fn describe(tokens: &[FormatToken]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn elide(text: &str) -> String {
    const LIMIT: usize = 40;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(LIMIT).collect();
        format!("{}...", prefix)
    }
}
