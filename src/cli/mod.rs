//! CLI module for gmaps-mcp - command-line interface and subcommands.
//!
//! The default command serves the tool set over stdio; the others run a
//! single tool or a trace analysis and print the result.

pub mod commands;
pub mod report;

pub use commands::Cli;
