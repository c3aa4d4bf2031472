//! # iflow
//!
//! Inspection front end for `iflow-core`: subcommands and their reports.

pub mod cli;
pub mod report;
