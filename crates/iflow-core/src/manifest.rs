//! # Manifest Module
//!
//! Metadata descriptor parsing and tag extraction.
//!
//! The descriptor is a line-oriented `Name: value` format. Only the main
//! section (everything before the first empty line) is read. A line that
//! starts with a single space continues the previous header's value.

use crate::layout::{ID_HEADER, NAME_HEADER};
use crate::{ManifestError, Tag};

/// Main-section headers of a metadata descriptor, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    headers: Vec<(String, String)>,
}

impl Manifest {
    /// Parse the main section of a descriptor.
    pub fn parse(bytes: &[u8]) -> Result<Self, ManifestError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ManifestError::NotUtf8)?;
        let normalized = text.replace("\r\n", "\n");
        let mut headers: Vec<(String, String)> = Vec::new();

        for (idx, line) in normalized.split(['\n', '\r']).enumerate() {
            if line.is_empty() {
                break;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let (_, value) = headers
                    .last_mut()
                    .ok_or(ManifestError::MalformedLine { line: idx + 1 })?;
                value.push_str(continuation);
                continue;
            }

            let (name, value) = line
                .split_once(": ")
                .filter(|(name, _)| is_header_name(name))
                .ok_or(ManifestError::MalformedLine { line: idx + 1 })?;
            headers.push((name.to_string(), value.to_string()));
        }

        Ok(Self { headers })
    }

    /// Value of header `name`, matched case-insensitively.
    ///
    /// When a header repeats, the last occurrence wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Number of headers, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extract the artifact tag from raw descriptor bytes.
///
/// The name header is checked before the identity header.
pub fn extract_tag(bytes: &[u8]) -> Result<Tag, ManifestError> {
    let manifest = Manifest::parse(bytes)?;
    tag_from_manifest(&manifest)
}

/// Build a tag from an already parsed descriptor.
pub fn tag_from_manifest(manifest: &Manifest) -> Result<Tag, ManifestError> {
    let name = manifest
        .get(NAME_HEADER)
        .ok_or(ManifestError::HeaderMissing(NAME_HEADER))?;
    let id_value = manifest
        .get(ID_HEADER)
        .ok_or(ManifestError::HeaderMissing(ID_HEADER))?;

    if name.is_empty() {
        return Err(ManifestError::EmptyName);
    }
    let id = extract_id(id_value)?;
    Ok(Tag::new(id, name))
}

/// Extract the flow id from the identity header value.
///
/// Two formats are known: `Foo` and `Foo; singleton:=true`. The directive
/// token is not inspected, only counted. Trailing empty tokens are dropped
/// before counting. The id token is returned as written, surrounding
/// whitespace included.
pub fn extract_id(value: &str) -> Result<&str, ManifestError> {
    if value.is_empty() {
        return Err(ManifestError::EmptyId);
    }

    let mut tokens: Vec<&str> = value.split(';').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    if tokens.is_empty() || tokens.len() > 2 {
        return Err(ManifestError::MalformedId(value.to_string()));
    }

    let id = tokens[0];
    if id.trim().is_empty() {
        return Err(ManifestError::EmptyId);
    }
    Ok(id)
}

// =============================================================================
// TESTS
// =============================================================================
