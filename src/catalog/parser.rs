//! Line-oriented parser for gettext message catalogs (`.po` / `.pot`).
//!
//! The parser keeps source line numbers on every entry so format checks can
//! point at the offending message. It stops at the first syntax error; a
//! file that does not tokenize cleanly cannot be checked further anyway.

use crate::error::CatalogIssue;
use std::collections::HashMap;

/// One message entry of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// Singular entries hold exactly one element; plural entries hold the
    /// `msgstr[N]` forms in index order.
    pub msgstr: Vec<String>,
    pub flags: Vec<String>,
    /// 1-based line of the `msgid` keyword
    pub line: usize,
}

impl CatalogEntry {
    /// The header entry is the one with an empty msgid and no context.
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// An entry whose every msgstr form is empty has not been translated.
    pub fn is_untranslated(&self) -> bool {
        self.msgstr.iter().all(|s| s.is_empty())
    }
}

/// A parsed catalog file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn header(&self) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.is_header())
    }

    /// Header metadata as `Key: Value` pairs, empty if there is no header.
    pub fn header_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Some(header) = self.header() {
            if let Some(text) = header.msgstr.first() {
                for line in text.split('\n') {
                    if let Some((key, value)) = line.split_once(':') {
                        let key = key.trim();
                        if !key.is_empty() {
                            fields.insert(key.to_string(), value.trim().to_string());
                        }
                    }
                }
            }
        }
        fields
    }
}

#[derive(Debug, Default)]
struct PendingEntry {
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    /// (declared index, accumulated text); `None` index means plain `msgstr`
    msgstr: Vec<(Option<usize>, String)>,
    flags: Vec<String>,
    line: usize,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.msgctxt.is_none() && self.msgid.is_none() && self.msgstr.is_empty()
    }
}

/// Which string the next bare `"..."` continuation line appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr(usize),
}

/// Parse catalog source text into a [`Catalog`].
pub fn parse(content: &str) -> Result<Catalog, CatalogIssue> {
    let mut entries = Vec::new();
    let mut pending = PendingEntry::default();
    let mut target: Option<Target> = None;

    for (idx, raw_line) in content.split('\n').enumerate() {
        let line_no = idx + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let trimmed = line.trim();

        if trimmed.is_empty() {
            finalize(&mut pending, &mut entries)?;
            target = None;
            continue;
        }

        if trimmed.starts_with("#~") {
            // Obsolete entry, ignored entirely.
            finalize(&mut pending, &mut entries)?;
            target = None;
            continue;
        }

        if let Some(flag_list) = trimmed.strip_prefix("#,") {
            // Flag comments precede the entry they describe.
            if pending.msgid.is_some() {
                finalize(&mut pending, &mut entries)?;
                target = None;
            }
            pending.flags.extend(
                flag_list
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty()),
            );
            continue;
        }

        if trimmed.starts_with('#') {
            // Translator / extracted / reference comments.
            if pending.msgid.is_some() {
                finalize(&mut pending, &mut entries)?;
                target = None;
            }
            continue;
        }

        if trimmed.starts_with('"') {
            let text = parse_quoted(trimmed, line_no)?;
            match target {
                Some(Target::Msgctxt) => {
                    if let Some(ctx) = pending.msgctxt.as_mut() {
                        ctx.push_str(&text);
                    }
                }
                Some(Target::Msgid) => {
                    if let Some(id) = pending.msgid.as_mut() {
                        id.push_str(&text);
                    }
                }
                Some(Target::MsgidPlural) => {
                    if let Some(plural) = pending.msgid_plural.as_mut() {
                        plural.push_str(&text);
                    }
                }
                Some(Target::Msgstr(slot)) => {
                    pending.msgstr[slot].1.push_str(&text);
                }
                None => {
                    return Err(CatalogIssue {
                        line: line_no,
                        message: "stray string literal outside any message".to_string(),
                    });
                }
            }
            continue;
        }

        // Keyword lines. `msgid_plural` and `msgstr[` must be matched before
        // their prefixes `msgid` and `msgstr`.
        if let Some(rest) = keyword_rest(trimmed, "msgid_plural") {
            if pending.msgid.is_none() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "msgid_plural without a preceding msgid".to_string(),
                });
            }
            if pending.msgid_plural.is_some() || !pending.msgstr.is_empty() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "unexpected msgid_plural".to_string(),
                });
            }
            pending.msgid_plural = Some(parse_quoted(rest, line_no)?);
            target = Some(Target::MsgidPlural);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("msgstr[") {
            let (index_text, remainder) = rest.split_once(']').ok_or_else(|| CatalogIssue {
                line: line_no,
                message: "malformed msgstr[N] keyword".to_string(),
            })?;
            let index: usize = index_text.trim().parse().map_err(|_| CatalogIssue {
                line: line_no,
                message: format!("invalid plural form index '{}'", index_text.trim()),
            })?;
            if pending.msgid.is_none() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "msgstr without a preceding msgid".to_string(),
                });
            }
            if pending.msgid_plural.is_none() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "msgstr[N] used without msgid_plural".to_string(),
                });
            }
            if index != pending.msgstr.len() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: format!(
                        "plural form index out of order (expected {}, found {})",
                        pending.msgstr.len(),
                        index
                    ),
                });
            }
            let text = parse_quoted(remainder.trim_start(), line_no)?;
            pending.msgstr.push((Some(index), text));
            target = Some(Target::Msgstr(pending.msgstr.len() - 1));
            continue;
        }

        if let Some(rest) = keyword_rest(trimmed, "msgstr") {
            if pending.msgid.is_none() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "msgstr without a preceding msgid".to_string(),
                });
            }
            if pending.msgid_plural.is_some() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "plural message requires msgstr[N] forms".to_string(),
                });
            }
            if !pending.msgstr.is_empty() {
                return Err(CatalogIssue {
                    line: line_no,
                    message: "duplicate msgstr".to_string(),
                });
            }
            let text = parse_quoted(rest, line_no)?;
            pending.msgstr.push((None, text));
            target = Some(Target::Msgstr(0));
            continue;
        }

        if let Some(rest) = keyword_rest(trimmed, "msgid") {
            if pending.msgid.is_some() {
                if pending.msgstr.is_empty() {
                    return Err(CatalogIssue {
                        line: pending.line,
                        message: "message is missing its msgstr section".to_string(),
                    });
                }
                finalize(&mut pending, &mut entries)?;
            }
            pending.msgid = Some(parse_quoted(rest, line_no)?);
            pending.line = line_no;
            target = Some(Target::Msgid);
            continue;
        }

        if let Some(rest) = keyword_rest(trimmed, "msgctxt") {
            if pending.msgid.is_some() {
                finalize(&mut pending, &mut entries)?;
            }
            pending.msgctxt = Some(parse_quoted(rest, line_no)?);
            pending.line = line_no;
            target = Some(Target::Msgctxt);
            continue;
        }

        return Err(CatalogIssue {
            line: line_no,
            message: format!("unrecognized catalog keyword: '{}'", first_word(trimmed)),
        });
    }

    finalize(&mut pending, &mut entries)?;
    Ok(Catalog { entries })
}

/// Close the pending entry, if it holds one, and push it onto `entries`.
fn finalize(
    pending: &mut PendingEntry,
    entries: &mut Vec<CatalogEntry>,
) -> Result<(), CatalogIssue> {
    if pending.is_empty() {
        // Dangling comments or flags before EOF are harmless.
        pending.flags.clear();
        pending.msgctxt = None;
        return Ok(());
    }

    let taken = std::mem::take(pending);
    let msgid = match taken.msgid {
        Some(id) => id,
        None => {
            // msgctxt with no msgid cannot form an entry.
            return Err(CatalogIssue {
                line: taken.line,
                message: "msgctxt without a following msgid".to_string(),
            });
        }
    };

    if taken.msgstr.is_empty() {
        return Err(CatalogIssue {
            line: taken.line,
            message: "message is missing its msgstr section".to_string(),
        });
    }

    entries.push(CatalogEntry {
        msgctxt: taken.msgctxt,
        msgid,
        msgid_plural: taken.msgid_plural,
        msgstr: taken.msgstr.into_iter().map(|(_, text)| text).collect(),
        flags: taken.flags,
        line: taken.line,
    });
    Ok(())
}

/// If `line` starts with `keyword` followed by whitespace or a quote,
/// return the remainder after the keyword.
fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(' ') || rest.starts_with('\t') || rest.starts_with('"') {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or(line)
}

/// Parse a quoted PO string segment, handling the usual escapes. The
/// closing quote must be the last non-whitespace character of the segment.
fn parse_quoted(segment: &str, line_no: usize) -> Result<String, CatalogIssue> {
    let segment = segment.trim();
    let mut chars = segment.chars();
    if chars.next() != Some('"') {
        return Err(CatalogIssue {
            line: line_no,
            message: "expected a quoted string".to_string(),
        });
    }

    let mut out = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {
                    return Err(CatalogIssue {
                        line: line_no,
                        message: "string ends in a bare backslash".to_string(),
                    });
                }
            },
            '"' => {
                closed = true;
                break;
            }
            other => out.push(other),
        }
    }

    if !closed {
        return Err(CatalogIssue {
            line: line_no,
            message: "unterminated string".to_string(),
        });
    }

    let trailing: &str = chars.as_str().trim();
    if !trailing.is_empty() {
        return Err(CatalogIssue {
            line: line_no,
            message: format!("unexpected content after closing quote: '{}'", trailing),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_PO: &str = r#"
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#: doc/source/index.rst:1
msgid "Hello"
msgstr "Bonjour"

#, fuzzy
msgid "World"
msgstr "Monde"
"#;

    // ==================== Happy Path Tests ====================

    #[test]
    fn test_parse_simple_catalog() {
        let catalog = parse(SIMPLE_PO).unwrap();

        assert_eq!(catalog.entries.len(), 3);
        assert!(catalog.entries[0].is_header());
        assert_eq!(catalog.entries[1].msgid, "Hello");
        assert_eq!(catalog.entries[1].msgstr, vec!["Bonjour"]);
        assert_eq!(catalog.entries[2].msgid, "World");
        assert!(catalog.entries[2].has_flag("fuzzy"));
    }

    #[test]
    fn test_header_fields() {
        let catalog = parse(SIMPLE_PO).unwrap();
        let fields = catalog.header_fields();

        assert_eq!(
            fields.get("Content-Type").map(String::as_str),
            Some("text/plain; charset=UTF-8")
        );
        assert!(fields.contains_key("Plural-Forms"));
    }

    #[test]
    fn test_parse_multiline_strings() {
        let source = "msgid \"\"\nmsgstr \"\"\n\nmsgid \"one \"\n\"two\"\nmsgstr \"un \"\n\"deux\"\n";
        let catalog = parse(source).unwrap();

        assert_eq!(catalog.entries[1].msgid, "one two");
        assert_eq!(catalog.entries[1].msgstr, vec!["un deux"]);
    }

    #[test]
    fn test_parse_plural_entry() {
        let source = r#"
msgid ""
msgstr ""

msgid "%d apple"
msgid_plural "%d apples"
msgstr[0] "%d pomme"
msgstr[1] "%d pommes"
"#;
        let catalog = parse(source).unwrap();
        let entry = &catalog.entries[1];

        assert_eq!(entry.msgid_plural.as_deref(), Some("%d apples"));
        assert_eq!(entry.msgstr, vec!["%d pomme", "%d pommes"]);
    }

    #[test]
    fn test_parse_msgctxt() {
        let source = "msgctxt \"menu\"\nmsgid \"Open\"\nmsgstr \"Ouvrir\"\n";
        let catalog = parse(source).unwrap();

        assert_eq!(catalog.entries[0].msgctxt.as_deref(), Some("menu"));
        assert_eq!(catalog.entries[0].msgid, "Open");
    }

    #[test]
    fn test_parse_escapes() {
        let source = "msgid \"a\\nb\\t\\\"c\\\"\"\nmsgstr \"x\"\n";
        let catalog = parse(source).unwrap();
        assert_eq!(catalog.entries[0].msgid, "a\nb\t\"c\"");
    }

    #[test]
    fn test_obsolete_entries_are_skipped() {
        let source = "msgid \"keep\"\nmsgstr \"garde\"\n\n#~ msgid \"old\"\n#~ msgstr \"vieux\"\n";
        let catalog = parse(source).unwrap();
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].msgid, "keep");
    }

    #[test]
    fn test_entry_line_numbers() {
        let catalog = parse(SIMPLE_PO).unwrap();
        // SIMPLE_PO starts with a blank line, so the header msgid is line 2.
        assert_eq!(catalog.entries[0].line, 2);
        assert_eq!(catalog.entries[1].msgid, "Hello");
        assert_eq!(catalog.entries[1].line, 8);
    }

    #[test]
    fn test_crlf_input() {
        let source = "msgid \"a\"\r\nmsgstr \"b\"\r\n";
        let catalog = parse(source).unwrap();
        assert_eq!(catalog.entries[0].msgstr, vec!["b"]);
    }

    #[test]
    fn test_untranslated_detection() {
        let source = "msgid \"a\"\nmsgstr \"\"\n";
        let catalog = parse(source).unwrap();
        assert!(catalog.entries[0].is_untranslated());
    }

    // ==================== Syntax Error Tests ====================

    #[test]
    fn test_unterminated_string() {
        let err = parse("msgid \"oops\nmsgstr \"x\"\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_msgstr_without_msgid() {
        let err = parse("msgstr \"orphan\"\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("without a preceding msgid"));
    }

    #[test]
    fn test_missing_msgstr_section() {
        let err = parse("msgid \"a\"\nmsgid \"b\"\nmsgstr \"x\"\n").unwrap_err();
        assert!(err.message.contains("missing its msgstr"));
    }

    #[test]
    fn test_plural_index_out_of_order() {
        let source = "msgid \"a\"\nmsgid_plural \"as\"\nmsgstr[1] \"x\"\n";
        let err = parse(source).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("out of order"));
    }

    #[test]
    fn test_msgstr_bracket_without_plural() {
        let source = "msgid \"a\"\nmsgstr[0] \"x\"\n";
        let err = parse(source).unwrap_err();
        assert!(err.message.contains("without msgid_plural"));
    }

    #[test]
    fn test_plain_msgstr_on_plural_message() {
        let source = "msgid \"a\"\nmsgid_plural \"as\"\nmsgstr \"x\"\n";
        let err = parse(source).unwrap_err();
        assert!(err.message.contains("msgstr[N]"));
    }

    #[test]
    fn test_stray_continuation() {
        let err = parse("\"floating\"\n").unwrap_err();
        assert!(err.message.contains("stray string"));
    }

    #[test]
    fn test_unknown_keyword() {
        let err = parse("message \"a\"\n").unwrap_err();
        assert!(err.message.contains("unrecognized"));
    }

    #[test]
    fn test_trailing_garbage_after_quote() {
        let err = parse("msgid \"a\" tail\nmsgstr \"b\"\n").unwrap_err();
        assert!(err.message.contains("after closing quote"));
    }

    #[test]
    fn test_duplicate_msgstr() {
        let err = parse("msgid \"a\"\nmsgstr \"b\"\nmsgstr \"c\"\n").unwrap_err();
        assert!(err.message.contains("duplicate msgstr"));
    }
}
