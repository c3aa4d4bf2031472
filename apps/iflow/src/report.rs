//! # Report Types
//!
//! Serializable views of an assembled [`Artifact`], shared by the text and
//! JSON renderings of every subcommand.

use iflow_core::{Artifact, Resource, ResourceType, Tag};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

// =============================================================================
// TAG REPORT
// =============================================================================

/// Identity of the inspected flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReport {
    pub id: String,
    pub name: String,
}

impl From<&Tag> for TagReport {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id().to_string(),
            name: tag.name().to_string(),
        }
    }
}

impl TagReport {
    pub fn render(&self) -> String {
        format!("Id:   {}\nName: {}\n", self.id, self.name)
    }
}

// =============================================================================
// INSPECT REPORT
// =============================================================================

/// One classified file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub name: String,
    pub size: usize,
}

impl From<&Resource> for ResourceReport {
    fn from(resource: &Resource) -> Self {
        Self {
            name: resource.name().to_string(),
            size: resource.content().len(),
        }
    }
}

/// All files of one resource type, in artifact order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReport {
    pub resource_type: ResourceType,
    pub resources: Vec<ResourceReport>,
}

/// Classification summary of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReport {
    pub tag: TagReport,
    pub flow_root: String,
    pub parameters_applied: bool,
    pub types: Vec<TypeReport>,
}

impl InspectReport {
    /// Build the report, restricted to `only` when given.
    pub fn new(artifact: &Artifact, only: Option<ResourceType>) -> Self {
        let types = ResourceType::ALL
            .into_iter()
            .filter(|t| only.is_none_or(|o| o == *t))
            .map(|resource_type| TypeReport {
                resource_type,
                resources: artifact
                    .resources_by_type(resource_type)
                    .iter()
                    .map(ResourceReport::from)
                    .collect(),
            })
            .collect();

        Self {
            tag: TagReport::from(artifact.tag()),
            flow_root: artifact.flow_document().root().name().to_string(),
            parameters_applied: artifact.parameters().is_some(),
            types,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Integration Flow {} ({})", self.tag.name, self.tag.id);
        let _ = writeln!(out, "==================");
        let _ = writeln!(out, "Flow root:  {}", self.flow_root);
        let _ = writeln!(
            out,
            "Parameters: {}",
            if self.parameters_applied { "applied" } else { "none" }
        );

        for entry in &self.types {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} ({})", entry.resource_type, entry.resources.len());
            for resource in &entry.resources {
                let _ = writeln!(out, "  {} [{} bytes]", resource.name, resource.size);
            }
        }
        out
    }
}

// =============================================================================
// PARAMETERS REPORT
// =============================================================================

/// Externalized parameters applied to the flow definition, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersReport {
    pub tag: TagReport,
    /// `None` when the package carries no parameters file.
    pub parameters: Option<Vec<(String, String)>>,
}

impl ParametersReport {
    pub fn new(artifact: &Artifact) -> Self {
        Self {
            tag: TagReport::from(artifact.tag()),
            parameters: artifact.parameters().map(|p| {
                p.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }),
        }
    }

    pub fn render(&self) -> String {
        match &self.parameters {
            None => format!("{}: no externalized parameters\n", self.tag.id),
            Some(pairs) => {
                let mut out = String::new();
                for (key, value) in pairs {
                    let _ = writeln!(out, "{key}={value}");
                }
                out
            }
        }
    }
}
