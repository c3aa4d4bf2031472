//! # Artifact Module
//!
//! The immutable, fully classified integration-flow package.
//!
//! An `Artifact` only exists fully built: it is produced by
//! [`crate::assembler::assemble`] and has no mutating API.

use crate::collector::ResourceMap;
use crate::{ArtifactError, FlowDocument, Parameters, Resource, ResourceType, Tag};
use std::path::Path;

/// A classified integration-flow package.
///
/// Holds an entry for every [`ResourceType`], so lookups never fail.
#[derive(Debug, Clone)]
pub struct Artifact {
    tag: Tag,
    flow_document: FlowDocument,
    resources: ResourceMap,
    parameters: Option<Parameters>,
}

impl Artifact {
    /// Build an artifact from the expanded package at `root`.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        crate::assembler::assemble(root.as_ref())
    }

    pub(crate) fn new(
        tag: Tag,
        flow_document: FlowDocument,
        mut resources: ResourceMap,
        parameters: Option<Parameters>,
    ) -> Self {
        for resource_type in ResourceType::ALL {
            resources.entry(resource_type).or_default();
        }
        Self {
            tag,
            flow_document,
            resources,
            parameters,
        }
    }

    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// The parsed flow definition, after parameter resolution.
    #[must_use]
    pub fn flow_document(&self) -> &FlowDocument {
        &self.flow_document
    }

    /// Resources of one type, ordered by file name. Possibly empty.
    #[must_use]
    pub fn resources_by_type(&self, resource_type: ResourceType) -> &[Resource] {
        self.resources
            .get(&resource_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every resource, by type then by name.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values().flatten()
    }

    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    /// Externalized parameters, if the package defines any.
    #[must_use]
    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }
}
