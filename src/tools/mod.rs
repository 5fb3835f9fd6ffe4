//! Tool system
//!
//! Each tool is a thin facade over one Maps Platform operation (or, for the
//! traffic and safety tools, a few operations plus scoring). Tools share a
//! `ToolContext` holding the invoker and result limits, and every execution
//! ends in a `ToolResponse` envelope.

mod args;
mod context;
mod registry;
mod routes;

mod calculate_distance_matrix;
mod calculate_route_safety_factors;
mod geocode_address;
mod get_directions;
mod get_place_details;
mod get_route_elevation_gain;
mod get_speed_limits;
mod get_traffic_conditions;
mod reverse_geocode;
mod search_places;
mod snap_to_roads;

pub use context::{Limits, ToolContext, ToolError};
pub use registry::{InvocationRequest, ToolRegistry};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named unit of work with a declared input schema
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable tool name, unique within a registry
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Do the work and return the reduced `data` payload
    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError>;

    /// Execute the tool, collapsing any failure into an error envelope
    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResponse {
        match self.run(&input, ctx).await {
            Ok(data) => {
                log::info!("tool_succeeded tool={}", self.name());
                ToolResponse::success(self.name(), data)
            }
            Err(e) => {
                log::error!("tool_failed tool={} error={}", self.name(), e);
                ToolResponse::error(self.name(), e.to_string())
            }
        }
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Uniform result of every tool invocation.
///
/// Serializes as `{"status":"success","tool":..,"data":..}` or
/// `{"status":"error","tool":..,"error":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse {
    Success { tool: String, data: Value },
    Error { tool: String, error: String },
}

impl ToolResponse {
    pub fn success(tool: impl Into<String>, data: Value) -> Self {
        ToolResponse::Success {
            tool: tool.into(),
            data,
        }
    }

    /// Error envelope; an empty message is replaced so `error` is never blank
    pub fn error(tool: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        ToolResponse::Error {
            tool: tool.into(),
            error: if error.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                error
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success { .. })
    }

    pub fn tool(&self) -> &str {
        match self {
            ToolResponse::Success { tool, .. } | ToolResponse::Error { tool, .. } => tool,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ToolResponse::Success { data, .. } => Some(data),
            ToolResponse::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResponse::Success { .. } => None,
            ToolResponse::Error { error, .. } => Some(error),
        }
    }

    /// Pretty-printed JSON text of the envelope
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"status\":\"error\",\"tool\":{:?},\"error\":\"Failed to serialize response: {}\"}}",
                self.tool(),
                e
            )
        })
    }
}

/// Tool descriptor as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Descriptor in the JSON-RPC `tools/list` shape
    pub fn to_rpc_schema(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

pub use calculate_distance_matrix::CalculateDistanceMatrixTool;
pub use calculate_route_safety_factors::CalculateRouteSafetyFactorsTool;
pub use geocode_address::GeocodeAddressTool;
pub use get_directions::GetDirectionsTool;
pub use get_place_details::GetPlaceDetailsTool;
pub use get_route_elevation_gain::GetRouteElevationGainTool;
pub use get_speed_limits::GetSpeedLimitsTool;
pub use get_traffic_conditions::GetTrafficConditionsTool;
pub use reverse_geocode::ReverseGeocodeTool;
pub use search_places::SearchPlacesTool;
pub use snap_to_roads::{MIN_PATH_POINTS, SnapToRoadsTool};
