//! gmaps-mcp - Google Maps Platform tools for fleet routing and safety
//!
//! A fixed set of Maps tools (places, directions, geocoding, distance
//! matrix, roads, elevation) plus derived traffic, route-safety and GPS
//! compliance scoring. Tools are served over newline-delimited JSON-RPC on
//! stdio, and every call ends in a uniform success/error envelope.

pub mod config;
pub mod error;
pub mod invoker;
pub mod maps;
pub mod model;
pub mod scoring;
pub mod server;
pub mod tools;
pub mod trace;

pub use config::Config;
pub use error::{GmapsError, Result};
pub use server::McpServer;
pub use tools::{ToolRegistry, ToolResponse};
pub use trace::{ComplianceReport, TraceAnalyzer};
