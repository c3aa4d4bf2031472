//! # CLI Command Implementations

use crate::report::{InspectReport, ParametersReport, TagReport};
use iflow_core::{Artifact, ArtifactError, ResourceType};
use serde::Serialize;
use std::path::Path;

fn load(package: &Path) -> Result<Artifact, ArtifactError> {
    tracing::debug!(package = %package.display(), "assembling artifact");
    Artifact::from_dir(package)
}

fn print_report<T: Serialize>(report: &T, json_mode: bool, text: impl FnOnce(&T) -> String) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    } else {
        print!("{}", text(report));
    }
}

// =============================================================================
// TAG COMMAND
// =============================================================================

pub fn cmd_tag(package: &Path, json_mode: bool) -> Result<(), ArtifactError> {
    let artifact = load(package)?;
    print_report(&TagReport::from(artifact.tag()), json_mode, TagReport::render);
    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

pub fn cmd_inspect(
    package: &Path,
    json_mode: bool,
    resource_type: Option<ResourceType>,
) -> Result<(), ArtifactError> {
    let artifact = load(package)?;
    let report = InspectReport::new(&artifact, resource_type);
    print_report(&report, json_mode, InspectReport::render);
    Ok(())
}

// =============================================================================
// PARAMETERS COMMAND
// =============================================================================

pub fn cmd_parameters(package: &Path, json_mode: bool) -> Result<(), ArtifactError> {
    let artifact = load(package)?;
    print_report(
        &ParametersReport::new(&artifact),
        json_mode,
        ParametersReport::render,
    );
    Ok(())
}
