//! # iflow-core
//!
//! Typed, immutable model of an expanded integration-flow package - THE PIPELINE.
//!
//! This crate reads a package directory with a fixed layout and produces one
//! [`Artifact`]: the flow's [`Tag`], every constituent file classified by
//! [`ResourceType`], and the parsed flow definition with externalized
//! parameters inlined. The artifact is the sole input of rule engines.
//!
//! ## Pipeline
//!
//! - `manifest` → identity tag from the metadata descriptor
//! - `parameters` + `transform` + `resolver` → externalized parameters
//! - `layout` + `collector` → per-type resource collections
//! - `assembler` → orchestration into an immutable `Artifact`
//!
//! ## Architectural Constraints
//!
//! - Synchronous, single-threaded construction; no async, no network
//! - Every failure aborts the build; no partially built artifact escapes
//! - Deterministic ordering (BTreeMap, resources sorted by name)
//!
//! ## Example
//!
//! ```no_run
//! use iflow_core::{Artifact, ResourceType};
//!
//! let artifact = Artifact::from_dir("expanded/OrderReplication")?;
//! for script in artifact.resources_by_type(ResourceType::GroovyScript) {
//!     println!("{}: {} bytes", script.name(), script.content().len());
//! }
//! # Ok::<(), iflow_core::ArtifactError>(())
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod artifact;
pub mod assembler;
pub mod collector;
pub mod document;
pub mod layout;
pub mod manifest;
pub mod parameters;
pub mod resolver;
pub mod transform;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ArtifactError, ManifestError, ParametersError, Resource, ResourceType, StructuralError, Tag,
    UnknownResourceType, resource_name,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use artifact::Artifact;
pub use assembler::assemble;
pub use collector::{ResourceCollector, ResourceMap};
pub use document::{Element, FlowDocument, Node};
pub use layout::{RESOURCE_TABLE, ResourceLocation};
pub use manifest::{Manifest, extract_tag};
pub use parameters::Parameters;
pub use resolver::Resolution;
pub use transform::{ParameterTransform, REPLACE_EXTERNAL_PARAMETERS};
