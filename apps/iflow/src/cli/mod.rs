//! # iflow CLI Module
//!
//! ## Available Commands
//!
//! - `tag` - Show the flow's id and name
//! - `inspect` - List classified resources per type
//! - `parameters` - Show the externalized parameters that were applied

mod commands;

use clap::{Parser, Subcommand};
use iflow_core::{ArtifactError, ResourceType};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// iflow - inspect expanded integration-flow packages
///
/// Builds the same immutable artifact that rule engines consume and prints
/// what it contains.
#[derive(Parser, Debug)]
#[command(name = "iflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the flow's tag (id and name)
    Tag {
        /// Root directory of the expanded package
        package: PathBuf,
    },

    /// List every resource type with its resources
    Inspect {
        /// Root directory of the expanded package
        package: PathBuf,

        /// Only show one resource type (e.g. groovy-script, xslt-mapping)
        #[arg(short = 't', long = "type")]
        resource_type: Option<ResourceType>,
    },

    /// Show the externalized parameters applied to the flow definition
    Parameters {
        /// Root directory of the expanded package
        package: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), ArtifactError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Tag { package } => cmd_tag(&package, json_mode),
        Commands::Inspect {
            package,
            resource_type,
        } => cmd_inspect(&package, json_mode, resource_type),
        Commands::Parameters { package } => cmd_parameters(&package, json_mode),
    }
}
