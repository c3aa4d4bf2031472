//! # Collector Module
//!
//! Classification of package files into typed resources.
//!
//! - Iterates `RESOURCE_TABLE` once
//! - Scans each directory non-recursively
//! - A missing or unreadable directory yields an EMPTY collection, not an error
//! - Once a file is listed, failing to read it IS an error
//! - The flow definition is never read here: it arrives already resolved

use crate::layout::{RESOURCE_TABLE, ResourceLocation, location_of};
use crate::{ArtifactError, Resource, ResourceType, StructuralError, Tag};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resources of an artifact grouped by type.
pub type ResourceMap = BTreeMap<ResourceType, Vec<Resource>>;

/// Read a whole file, attributing failures to `path`.
pub(crate) fn read_fully(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Collects the resources of one package.
pub struct ResourceCollector<'a> {
    root: &'a Path,
    tag: &'a Tag,
}

impl<'a> ResourceCollector<'a> {
    #[must_use]
    pub fn new(root: &'a Path, tag: &'a Tag) -> Self {
        Self { root, tag }
    }

    /// Path of the single flow definition file.
    ///
    /// Zero or several candidates is `AmbiguousOrMissingFlowDefinition`.
    pub fn locate_flow_definition(&self) -> Result<PathBuf, StructuralError> {
        let location = location_of(ResourceType::FlowDefinition);
        match <[PathBuf; 1]>::try_from(self.matching_files(location)) {
            Ok([path]) => Ok(path),
            Err(found) => Err(StructuralError::AmbiguousOrMissingFlowDefinition {
                directory: location.directory_in(self.root),
                found: found.len(),
            }),
        }
    }

    /// Collect every resource type.
    ///
    /// `flow_definition` becomes the sole flow-definition resource; its
    /// directory is not read again.
    pub fn collect(&self, flow_definition: Resource) -> Result<ResourceMap, ArtifactError> {
        let mut resources = ResourceMap::new();
        let mut flow_definition = Some(flow_definition);

        for location in &RESOURCE_TABLE {
            let collected = match location.resource_type {
                ResourceType::FlowDefinition => flow_definition.take().into_iter().collect(),
                resource_type => self.collect_type(resource_type)?,
            };
            debug!(
                resource_type = %location.resource_type,
                count = collected.len(),
                "collected resources"
            );
            resources.insert(location.resource_type, collected);
        }

        Ok(resources)
    }

    /// Collect resources of one type straight from disk.
    ///
    /// For the flow definition exactly one file must match.
    pub fn collect_type(&self, resource_type: ResourceType) -> Result<Vec<Resource>, ArtifactError> {
        if resource_type == ResourceType::FlowDefinition {
            let path = self.locate_flow_definition()?;
            return Ok(vec![self.load(resource_type, &path)?]);
        }

        self.matching_files(location_of(resource_type))
            .iter()
            .map(|path| self.load(resource_type, path))
            .collect()
    }

    /// Build a resource from `path` with already available `content`.
    pub fn resource_with_content(
        &self,
        resource_type: ResourceType,
        path: &Path,
        content: Vec<u8>,
    ) -> Result<Resource, StructuralError> {
        Resource::new(
            self.tag.clone(),
            resource_type,
            &path.to_string_lossy(),
            content,
        )
    }

    fn load(&self, resource_type: ResourceType, path: &Path) -> Result<Resource, ArtifactError> {
        let content = read_fully(path)?;
        Ok(self.resource_with_content(resource_type, path, content)?)
    }

    /// Regular files in the location's directory matching its suffixes,
    /// sorted by path.
    fn matching_files(&self, location: &ResourceLocation) -> Vec<PathBuf> {
        let directory = location.directory_in(self.root);
        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(
                    directory = %directory.display(),
                    error = %e,
                    "resource directory not readable, treating as empty"
                );
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(directory = %directory.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !location.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping matching entry that is not a file");
            }
        }

        files.sort();
        files
    }
}

// =============================================================================
// TESTS
// =============================================================================
