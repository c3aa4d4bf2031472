//! # Package Layout
//!
//! Hardcoded locations inside an expanded integration-flow package.
//!
//! The layout is fixed: these constants are compiled into the binary and
//! are immutable at runtime. Adding a resource type is a change to
//! [`RESOURCE_TABLE`] only; the collector iterates the table once.

use crate::ResourceType;
use std::path::{Path, PathBuf};

/// Metadata descriptor, relative to the package root.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Header carrying the flow's display name.
pub const NAME_HEADER: &str = "Bundle-Name";

/// Header carrying the flow's symbolic identifier.
pub const ID_HEADER: &str = "Bundle-SymbolicName";

/// Root of all flow resources, relative to the package root.
pub const RESOURCES_BASE_PATH: &str = "src/main/resources";

/// Externalized parameters file, relative to the package root.
pub const PARAMETERS_PATH: &str = "src/main/resources/parameters.prop";

/// Directory holding the flow definition, relative to the package root.
pub const FLOW_DEFINITION_DIR: &str = "src/main/resources/scenarioflows/integrationflow";

// =============================================================================
// RESOURCE TABLE
// =============================================================================

/// Where resources of one type live and which files belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLocation {
    pub resource_type: ResourceType,
    /// Directory relative to the package root. Scanned non-recursively.
    pub directory: &'static str,
    /// Case-sensitive file name suffixes; any one match is enough.
    pub suffixes: &'static [&'static str],
}

impl ResourceLocation {
    /// Whether `file_name` ends in one of this location's suffixes.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|suffix| file_name.ends_with(suffix))
    }

    /// Absolute directory for this location under `root`.
    #[must_use]
    pub fn directory_in(&self, root: &Path) -> PathBuf {
        root.join(self.directory)
    }
}

/// One entry per [`ResourceType`], in declaration order.
///
/// Several types share a directory (scripts, mappings); suffixes keep them
/// apart.
pub const RESOURCE_TABLE: [ResourceLocation; 10] = [
    ResourceLocation {
        resource_type: ResourceType::GroovyScript,
        directory: "src/main/resources/script",
        suffixes: &[".groovy", ".gsh"],
    },
    ResourceLocation {
        resource_type: ResourceType::JavascriptScript,
        directory: "src/main/resources/script",
        suffixes: &[".js"],
    },
    ResourceLocation {
        resource_type: ResourceType::Xsd,
        directory: "src/main/resources/xsd",
        suffixes: &[".xsd"],
    },
    ResourceLocation {
        resource_type: ResourceType::MessageMapping,
        directory: "src/main/resources/mapping",
        suffixes: &[".mmap"],
    },
    ResourceLocation {
        resource_type: ResourceType::XsltMapping,
        directory: "src/main/resources/mapping",
        suffixes: &[".xsl", ".xslt"],
    },
    ResourceLocation {
        resource_type: ResourceType::FlowDefinition,
        directory: FLOW_DEFINITION_DIR,
        suffixes: &[".iflw"],
    },
    ResourceLocation {
        resource_type: ResourceType::Archive,
        directory: "src/main/resources/lib",
        suffixes: &[".jar", ".zip"],
    },
    ResourceLocation {
        resource_type: ResourceType::Wsdl,
        directory: "src/main/resources/wsdl",
        suffixes: &[".wsdl"],
    },
    ResourceLocation {
        resource_type: ResourceType::Edmx,
        directory: "src/main/resources/edmx",
        suffixes: &[".edmx"],
    },
    ResourceLocation {
        resource_type: ResourceType::OperationMapping,
        directory: "src/main/resources/mapping",
        suffixes: &[".opmap"],
    },
];

/// Table entry for `resource_type`.
#[must_use]
pub fn location_of(resource_type: ResourceType) -> &'static ResourceLocation {
    // RESOURCE_TABLE is ordered like ResourceType::ALL.
    &RESOURCE_TABLE[resource_type as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_type_in_order() {
        let types: Vec<_> = RESOURCE_TABLE.iter().map(|l| l.resource_type).collect();
        assert_eq!(types, ResourceType::ALL.to_vec());
    }

    #[test]
    fn location_of_returns_matching_entry() {
        for t in ResourceType::ALL {
            assert_eq!(location_of(t).resource_type, t);
        }
    }

    #[test]
    fn every_directory_is_under_resources_base() {
        for location in &RESOURCE_TABLE {
            assert!(location.directory.starts_with(RESOURCES_BASE_PATH));
        }
        assert!(PARAMETERS_PATH.starts_with(RESOURCES_BASE_PATH));
    }

    #[test]
    fn suffix_match_is_disjunctive() {
        let xslt = location_of(ResourceType::XsltMapping);
        assert!(xslt.matches("transform.xsl"));
        assert!(xslt.matches("transform.xslt"));
        assert!(!xslt.matches("transform.mmap"));
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let groovy = location_of(ResourceType::GroovyScript);
        assert!(groovy.matches("script.groovy"));
        assert!(groovy.matches("script.gsh"));
        assert!(!groovy.matches("script.GROOVY"));
    }

    #[test]
    fn shared_directories_do_not_overlap() {
        let js = location_of(ResourceType::JavascriptScript);
        let groovy = location_of(ResourceType::GroovyScript);
        assert_eq!(js.directory, groovy.directory);
        assert!(!js.matches("a.groovy"));
        assert!(!groovy.matches("a.js"));
    }
}
