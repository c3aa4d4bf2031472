//! # iflow - Integration Flow Inspector
//!
//! Builds the artifact of an expanded integration-flow package with
//! `iflow-core` and prints what rule engines would see.
//!
//! ## Usage
//!
//! ```bash
//! iflow tag expanded/OrderReplication
//! iflow inspect expanded/OrderReplication --type groovy-script
//! iflow parameters expanded/OrderReplication --json
//! ```

use clap::Parser;
use iflow::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // IFLOW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("IFLOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "iflow=info,iflow_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        eprintln!("iflow v{}", env!("CARGO_PKG_VERSION"));
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
