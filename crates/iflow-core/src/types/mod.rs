//! # Core Type Definitions
//!
//! This module contains the value types shared by every pipeline stage:
//! - Artifact identity (`Tag`)
//! - Resource classification (`ResourceType`, `Resource`)
//! - Error types (`ArtifactError` and its categories)
//!
//! ## Determinism Guarantees
//!
//! `ResourceType` implements `Ord` so that maps keyed by it iterate in
//! declaration order. All values are immutable once constructed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// TAG
// =============================================================================

/// Identity of an integration flow, taken from its metadata descriptor.
///
/// Both fields are guaranteed non-empty when produced by
/// [`crate::manifest::extract_tag`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    id: String,
    name: String,
}

impl Tag {
    /// Create a new tag.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The flow's symbolic identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The flow's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// =============================================================================
// RESOURCE TYPE
// =============================================================================

/// Closed set of resource kinds an integration flow package can carry.
///
/// Declaration order is the iteration order of every per-type map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    GroovyScript,
    JavascriptScript,
    Xsd,
    MessageMapping,
    XsltMapping,
    FlowDefinition,
    Archive,
    Wsdl,
    Edmx,
    OperationMapping,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [ResourceType; 10] = [
        ResourceType::GroovyScript,
        ResourceType::JavascriptScript,
        ResourceType::Xsd,
        ResourceType::MessageMapping,
        ResourceType::XsltMapping,
        ResourceType::FlowDefinition,
        ResourceType::Archive,
        ResourceType::Wsdl,
        ResourceType::Edmx,
        ResourceType::OperationMapping,
    ];

    /// The kebab-case name used in reports and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceType::GroovyScript => "groovy-script",
            ResourceType::JavascriptScript => "javascript-script",
            ResourceType::Xsd => "xsd",
            ResourceType::MessageMapping => "message-mapping",
            ResourceType::XsltMapping => "xslt-mapping",
            ResourceType::FlowDefinition => "flow-definition",
            ResourceType::Archive => "archive",
            ResourceType::Wsdl => "wsdl",
            ResourceType::Edmx => "edmx",
            ResourceType::OperationMapping => "operation-mapping",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

/// Returned when a string names no [`ResourceType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource type: {0}")]
pub struct UnknownResourceType(pub String);

// =============================================================================
// RESOURCE
// =============================================================================

/// One classified file belonging to an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    tag: Tag,
    resource_type: ResourceType,
    name: String,
    content: Vec<u8>,
}

impl Resource {
    /// Create a resource whose name is the final segment of `location`.
    ///
    /// Returns `StructuralError::InvalidResourceLocation` if `location`
    /// ends in a path separator.
    pub fn new(
        tag: Tag,
        resource_type: ResourceType,
        location: &str,
        content: Vec<u8>,
    ) -> Result<Self, StructuralError> {
        let name = resource_name(location)?.to_string();
        Ok(Self {
            tag,
            resource_type,
            name,
            content,
        })
    }

    /// The tag of the artifact this resource belongs to.
    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// File name of the resource, without any directory part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full content of the resource.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Derive a resource name from its location: everything after the last
/// separator.
///
/// Both `/` and the platform separator are recognised. A location ending
/// in a separator names a directory and is rejected.
pub fn resource_name(location: &str) -> Result<&str, StructuralError> {
    let is_separator = |c: char| c == '/' || c == std::path::MAIN_SEPARATOR;
    if location.is_empty() || location.ends_with(is_separator) {
        return Err(StructuralError::InvalidResourceLocation(
            location.to_string(),
        ));
    }
    Ok(location
        .rfind(is_separator)
        .map_or(location, |idx| &location[idx + 1..]))
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that abort artifact construction.
///
/// - No silent failures
/// - No partially built artifact is ever returned
/// - Absent optional resource directories are NOT errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The package tree does not have the expected shape.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// The metadata descriptor lacks or garbles a required header.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Externalized parameters could not be parsed or applied.
    #[error(transparent)]
    Parameters(#[from] ParametersError),

    /// A file whose presence was mandatory could not be read.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Structural problems with the package tree.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// No metadata descriptor at the expected location.
    #[error("Metadata descriptor not found at {}; not an integration flow package", .0.display())]
    MissingManifest(PathBuf),

    /// The flow-definition directory holds zero or several definitions.
    #[error("Expected exactly one flow definition in {}, found {found}", .directory.display())]
    AmbiguousOrMissingFlowDefinition { directory: PathBuf, found: usize },

    /// A resource location ends in a separator.
    #[error("Resource location cannot end in a separator: {0}")]
    InvalidResourceLocation(String),

    /// The resolved flow definition is not a well-formed document.
    #[error("Malformed flow definition document: {0}")]
    MalformedFlowDocument(String),
}

/// Problems with the metadata descriptor's required headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// A required header is absent.
    #[error("Metadata descriptor does not contain the required {0} header")]
    HeaderMissing(&'static str),

    /// The identity header value is empty.
    #[error("Empty identity header value")]
    EmptyId,

    /// The identity header value does not split into one or two tokens.
    #[error("Unexpected identity header format: {0:?}")]
    MalformedId(String),

    /// The name header value is empty.
    #[error("Empty name header value")]
    EmptyName,

    /// A main-section line is not a `Name: value` header.
    #[error("Invalid header line {line} in metadata descriptor")]
    MalformedLine { line: usize },

    /// The descriptor is not valid UTF-8.
    #[error("Metadata descriptor is not valid UTF-8")]
    NotUtf8,
}

/// Problems with externalized parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParametersError {
    /// The parameters file cannot be parsed.
    #[error("Malformed parameters file at line {line}: {reason}")]
    FileMalformed { line: usize, reason: String },

    /// The parameter transform could not rewrite the flow definition.
    #[error("Parameter transform failed: {0}")]
    TransformFailed(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_name_is_last_segment() {
        assert_eq!(resource_name("/pkg/foo/bar.xsd").expect("name"), "bar.xsd");
        assert_eq!(resource_name("bar.xsd").expect("name"), "bar.xsd");
    }

    #[test]
    fn resource_name_rejects_trailing_separator() {
        let result = resource_name("/pkg/foo/");
        assert!(matches!(
            result,
            Err(StructuralError::InvalidResourceLocation(ref loc)) if loc == "/pkg/foo/"
        ));
    }

    #[test]
    fn resource_name_rejects_empty_location() {
        assert!(resource_name("").is_err());
    }

    #[test]
    fn resource_new_derives_name() {
        let tag = Tag::new("Flow", "My Flow");
        let res = Resource::new(tag.clone(), ResourceType::Xsd, "a/b/c.xsd", b"<x/>".to_vec())
            .expect("resource");
        assert_eq!(res.name(), "c.xsd");
        assert_eq!(res.tag(), &tag);
        assert_eq!(res.resource_type(), ResourceType::Xsd);
        assert_eq!(res.content(), b"<x/>");
    }

    #[test]
    fn resource_type_round_trips_through_str() {
        for t in ResourceType::ALL {
            assert_eq!(t.as_str().parse::<ResourceType>().expect("parse"), t);
        }
        assert!("flow".parse::<ResourceType>().is_err());
    }

    #[test]
    fn all_is_sorted_declaration_order() {
        let mut sorted = ResourceType::ALL;
        sorted.sort();
        assert_eq!(sorted, ResourceType::ALL);
    }

    #[test]
    fn tag_display() {
        let tag = Tag::new("HCITracker", "HCI Tracker");
        assert_eq!(tag.to_string(), "HCI Tracker (HCITracker)");
    }
}
