//! # Resolver Module
//!
//! Conditional externalized-parameter resolution for the flow definition.
//!
//! Runs at most once per artifact build, before resource collection. If the
//! parameters file is absent there is nothing to resolve and the raw flow
//! definition is used unchanged.

use crate::collector::read_fully;
use crate::layout::PARAMETERS_PATH;
use crate::transform::REPLACE_EXTERNAL_PARAMETERS;
use crate::{ArtifactError, Parameters};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Parameters read from the package.
    pub parameters: Parameters,
    /// Flow definition after placeholder substitution.
    pub document: Vec<u8>,
}

/// Location of the parameters file for the package at `root`.
#[must_use]
pub fn parameters_file(root: &Path) -> PathBuf {
    root.join(PARAMETERS_PATH)
}

/// Resolve externalized parameters into `flow_definition`.
///
/// Returns `Ok(None)` when the package has no parameters file. A parameters
/// path that exists but cannot be read is an `ArtifactError::Io`.
pub fn resolve(root: &Path, flow_definition: &[u8]) -> Result<Option<Resolution>, ArtifactError> {
    let path = parameters_file(root);
    if !path.exists() {
        debug!(path = %path.display(), "no externalized parameters file");
        return Ok(None);
    }

    let parameters = Parameters::parse(&read_fully(&path)?)?;
    let document = REPLACE_EXTERNAL_PARAMETERS.apply(flow_definition, &parameters)?;

    debug!(
        path = %path.display(),
        parameters = parameters.len(),
        transform = REPLACE_EXTERNAL_PARAMETERS.identity(),
        "externalized parameters applied"
    );

    Ok(Some(Resolution {
        parameters,
        document,
    }))
}
