//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: JSON-RPC tool server on stdin/stdout (default)
//! - tools: print the tool descriptors
//! - call: run one tool and print its envelope
//! - analyze-trace: score a recorded GPS trace against posted limits

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gmaps-mcp - Google Maps Platform tools for fleet routing and safety
#[derive(Parser, Debug)]
#[command(name = "gmaps-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the tools over newline-delimited JSON-RPC on stdin/stdout
    Serve,

    /// Print the tool descriptors as JSON
    Tools,

    /// Run a single tool and print its response envelope
    Call {
        /// Tool name (see `tools`)
        name: String,

        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// Analyze a recorded GPS trace for speed-limit compliance
    AnalyzeTrace {
        /// JSON file holding an array of {lat, lng, speed?} points
        file: PathBuf,

        /// Vehicle identifier stamped on the report
        #[arg(long, default_value = "unknown")]
        vehicle_id: String,

        /// Print the report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
