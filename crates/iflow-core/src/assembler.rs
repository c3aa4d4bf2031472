//! # Assembler Module
//!
//! Orchestrates one artifact build:
//!
//! 1. Metadata descriptor → `Tag`
//! 2. Locate the single flow definition
//! 3. Resolve externalized parameters (only if the parameters file exists)
//! 4. Collect all resource types, flow definition from step 3
//! 5. Parse the flow definition into a `FlowDocument`
//! 6. Freeze everything into an `Artifact`
//!
//! Any failure aborts the whole build.

use crate::collector::{ResourceCollector, ResourceMap, read_fully};
use crate::layout::MANIFEST_PATH;
use crate::{
    Artifact, ArtifactError, FlowDocument, Resource, ResourceType, StructuralError, manifest,
    resolver,
};
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Build the artifact for the expanded package at `root`.
pub fn assemble(root: &Path) -> Result<Artifact, ArtifactError> {
    let tag = manifest::extract_tag(&read_manifest(root)?)?;
    let collector = ResourceCollector::new(root, &tag);

    let flow_path = collector.locate_flow_definition()?;
    let raw = read_fully(&flow_path)?;

    let (content, parameters) = match resolver::resolve(root, &raw)? {
        Some(resolution) => (resolution.document, Some(resolution.parameters)),
        None => (raw, None),
    };
    let flow_definition =
        collector.resource_with_content(ResourceType::FlowDefinition, &flow_path, content)?;

    let resources = collector.collect(flow_definition)?;
    let flow_document = FlowDocument::parse(flow_definition_content(&resources))?;

    let artifact = Artifact::new(tag, flow_document, resources, parameters);
    info!(
        tag = %artifact.tag(),
        resources = artifact.resource_count(),
        parameters_applied = artifact.parameters().is_some(),
        "assembled integration flow artifact"
    );
    Ok(artifact)
}

fn read_manifest(root: &Path) -> Result<Vec<u8>, ArtifactError> {
    let path = root.join(MANIFEST_PATH);
    match read_fully(&path) {
        Err(ArtifactError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Err(StructuralError::MissingManifest(path).into())
        }
        other => other,
    }
}

fn flow_definition_content(resources: &ResourceMap) -> &[u8] {
    resources
        .get(&ResourceType::FlowDefinition)
        .and_then(|flows| flows.first())
        .map(Resource::content)
        .unwrap_or_default()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FLOW_DEFINITION_DIR, PARAMETERS_PATH};
    use crate::{ManifestError, ParametersError};
    use std::fs;

    const MANIFEST: &str = "Manifest-Version: 1.0\n\
        Bundle-Name: Order Replication\n\
        Bundle-SymbolicName: OrderReplication; singleton:=true\n";

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    fn package(flow: &[u8]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), MANIFEST_PATH, MANIFEST.as_bytes());
        write(dir.path(), &format!("{FLOW_DEFINITION_DIR}/Order.iflw"), flow);
        dir
    }

    #[test]
    fn assembles_minimal_package() {
        let dir = package(b"<flow/>");
        let artifact = assemble(dir.path()).expect("assemble");

        assert_eq!(artifact.tag().id(), "OrderReplication");
        assert_eq!(artifact.tag().name(), "Order Replication");
        assert_eq!(artifact.flow_document().root().name(), "flow");
        assert_eq!(artifact.resource_count(), 1);
        assert!(artifact.parameters().is_none());
    }

    #[test]
    fn missing_manifest_is_structural() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            assemble(dir.path()),
            Err(ArtifactError::Structural(StructuralError::MissingManifest(_)))
        ));
    }

    #[test]
    fn manifest_errors_propagate() {
        let dir = package(b"<flow/>");
        write(dir.path(), MANIFEST_PATH, b"Bundle-SymbolicName: X\n");
        assert!(matches!(
            assemble(dir.path()),
            Err(ArtifactError::Manifest(ManifestError::HeaderMissing(_)))
        ));
    }

    #[test]
    fn parameters_rewrite_flow_resource_and_document() {
        let dir = package(b"<flow><v>{{greeting}}</v></flow>");
        write(dir.path(), PARAMETERS_PATH, b"greeting=hello\n");

        let artifact = assemble(dir.path()).expect("assemble");
        let flow = &artifact.resources_by_type(ResourceType::FlowDefinition)[0];
        assert_eq!(flow.content(), b"<flow><v>hello</v></flow>");
        assert_eq!(artifact.flow_document().root().child("v").expect("v").text(), "hello");
        assert_eq!(
            artifact.parameters().and_then(|p| p.get("greeting")),
            Some("hello")
        );
    }

    #[test]
    fn transform_failure_aborts() {
        let dir = package(b"<flow><v>{{greeting}}</flow>");
        write(dir.path(), PARAMETERS_PATH, b"greeting=hello\n");
        assert!(matches!(
            assemble(dir.path()),
            Err(ArtifactError::Parameters(ParametersError::TransformFailed(_)))
        ));
    }

    #[test]
    fn second_root_with_parameters_is_transform_failure() {
        let dir = package(b"<flow>{{greeting}}</flow><other/>");
        write(dir.path(), PARAMETERS_PATH, b"greeting=hello\n");
        assert!(matches!(
            assemble(dir.path()),
            Err(ArtifactError::Parameters(ParametersError::TransformFailed(_)))
        ));
    }

    #[test]
    fn malformed_flow_without_parameters_is_structural() {
        let dir = package(b"<flow>");
        assert!(matches!(
            assemble(dir.path()),
            Err(ArtifactError::Structural(StructuralError::MalformedFlowDocument(_)))
        ));
    }
}
