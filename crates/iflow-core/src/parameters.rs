//! # Parameters Module
//!
//! Parser for the externalized parameters file (`key=value` properties text).
//!
//! - `#` and `!` start comment lines
//! - `=`, `:` or whitespace separate key from value
//! - An odd number of trailing backslashes continues the line
//! - `\t \n \r \f \uXXXX` escapes; any other escaped char is literal
//! - Later duplicate keys override earlier ones

use crate::ParametersError;
use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Parsed externalized parameters, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: BTreeMap<String, String>,
}

impl Parameters {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the raw content of a parameters file.
    ///
    /// Content that is not valid UTF-8 is decoded as ISO-8859-1.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParametersError> {
        let text = decode(bytes);
        let normalized = text.replace("\r\n", "\n");
        let mut natural = normalized.split(['\n', '\r']).enumerate();
        let mut entries = BTreeMap::new();

        while let Some((idx, raw)) = natural.next() {
            let line = raw.trim_start_matches(is_blank);
            if line.is_empty() || line.starts_with(['#', '!']) {
                continue;
            }

            let mut logical = line.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match natural.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical, idx + 1)?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Value for `key`, if defined.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or override a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for Parameters {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// =============================================================================
// LINE HANDLING
// =============================================================================

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Split a logical line into unescaped key and value.
fn split_entry(line: &str, line_no: usize) -> Result<(String, String), ParametersError> {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut chars = line.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' => {
                key_end = idx;
                value_start = idx + 1;
                break;
            }
            c if is_blank(c) => {
                key_end = idx;
                let rest = line[idx..].trim_start_matches(is_blank);
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .unwrap_or(rest);
                value_start = line.len() - rest.len();
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end], line_no)?;
    let value = unescape(line[value_start..].trim_start_matches(is_blank), line_no)?;
    Ok((key, value))
}

fn unescape(raw: &str, line_no: usize) -> Result<String, ParametersError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                out.push(decode_unicode_escape(&hex, line_no)?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn decode_unicode_escape(hex: &str, line_no: usize) -> Result<char, ParametersError> {
    let malformed = || ParametersError::FileMalformed {
        line: line_no,
        reason: format!("malformed \\uXXXX escape: \\u{hex}"),
    };
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    let code = u32::from_str_radix(hex, 16).map_err(|_| malformed())?;
    // Lone surrogates have no char; keep them visible instead of failing.
    Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Parameters {
        Parameters::parse(text.as_bytes()).expect("parse")
    }

    #[test]
    fn parses_simple_pairs() {
        let params = parse("greeting=hello\nreceiver:Bob\n");
        assert_eq!(params.get("greeting"), Some("hello"));
        assert_eq!(params.get("receiver"), Some("Bob"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn whitespace_separator_and_padding() {
        let params = parse("  host   =  example.org\nport 8080\nmode : fast");
        assert_eq!(params.get("host"), Some("example.org"));
        assert_eq!(params.get("port"), Some("8080"));
        assert_eq!(params.get("mode"), Some("fast"));
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let params = parse("# comment\n! also comment\n\n   \nkey=value\n");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("key"), Some("value"));
    }

    #[test]
    fn later_duplicates_override() {
        let params = parse("key=first\nkey=second\n");
        assert_eq!(params.get("key"), Some("second"));
    }

    #[test]
    fn backslash_continuation_joins_lines() {
        let params = parse("list=a,\\\n    b,\\\n    c\nnext=1");
        assert_eq!(params.get("list"), Some("a,b,c"));
        assert_eq!(params.get("next"), Some("1"));
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let params = parse("path=C:\\\\\nnext=1");
        assert_eq!(params.get("path"), Some("C:\\"));
        assert_eq!(params.get("next"), Some("1"));
    }

    #[test]
    fn continuation_at_end_of_input() {
        let params = parse("key=value\\");
        assert_eq!(params.get("key"), Some("value"));
    }

    #[test]
    fn escapes_are_decoded() {
        let params = parse("a\\=b=x\\ty\nu=\\u0041\\u00e9\nkey\\ with\\ space=v");
        assert_eq!(params.get("a=b"), Some("x\ty"));
        assert_eq!(params.get("u"), Some("Aé"));
        assert_eq!(params.get("key with space"), Some("v"));
    }

    #[test]
    fn malformed_unicode_escape_fails() {
        let result = Parameters::parse(b"ok=1\nbad=\\u12G4\n");
        assert!(matches!(
            result,
            Err(ParametersError::FileMalformed { line: 2, .. })
        ));
    }

    #[test]
    fn truncated_unicode_escape_fails() {
        assert!(Parameters::parse(b"bad=\\u12").is_err());
    }

    #[test]
    fn key_without_value() {
        let params = parse("lonely\nempty=\n");
        assert_eq!(params.get("lonely"), Some(""));
        assert_eq!(params.get("empty"), Some(""));
    }

    #[test]
    fn value_keeps_separators_after_first() {
        let params = parse("url=http://host:8080/a=b");
        assert_eq!(params.get("url"), Some("http://host:8080/a=b"));
    }

    #[test]
    fn crlf_and_cr_line_endings() {
        let params = parse("a=1\r\nb=2\rc=3");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.get("c"), Some("3"));
    }

    #[test]
    fn latin1_fallback() {
        let params = Parameters::parse(b"name=caf\xe9").expect("parse");
        assert_eq!(params.get("name"), Some("café"));
    }

    #[test]
    fn iteration_is_key_ordered() {
        let params = parse("b=2\na=1\nc=3");
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
