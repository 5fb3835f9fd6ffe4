//! Tool registry - holds the fixed tool set and dispatches invocations by name

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use super::{
    CalculateDistanceMatrixTool, CalculateRouteSafetyFactorsTool, GeocodeAddressTool, GetDirectionsTool,
    GetPlaceDetailsTool, GetRouteElevationGainTool, GetSpeedLimitsTool, GetTrafficConditionsTool, ReverseGeocodeTool,
    SearchPlacesTool, SnapToRoadsTool, Tool, ToolContext, ToolDefinition, ToolResponse,
};

/// One request to execute a named tool
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub tool_name: String,
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Ordered set of tools, unique by name
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with every Maps tool, in listing order
    pub fn standard() -> Self {
        let mut registry = Self::new();

        // Places
        registry.add_tool(Box::new(SearchPlacesTool));
        registry.add_tool(Box::new(GetPlaceDetailsTool));

        // Routing and geocoding
        registry.add_tool(Box::new(GetDirectionsTool));
        registry.add_tool(Box::new(GeocodeAddressTool));
        registry.add_tool(Box::new(ReverseGeocodeTool));
        registry.add_tool(Box::new(CalculateDistanceMatrixTool));

        // Roads
        registry.add_tool(Box::new(SnapToRoadsTool));
        registry.add_tool(Box::new(GetSpeedLimitsTool));

        // Derived analytics
        registry.add_tool(Box::new(GetTrafficConditionsTool));
        registry.add_tool(Box::new(CalculateRouteSafetyFactorsTool));
        registry.add_tool(Box::new(GetRouteElevationGainTool));

        registry
    }

    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Add a tool; a tool with the same name is replaced in place
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Tool descriptors in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get the list of tool names
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one invocation.
    ///
    /// Never fails: unknown names and panics inside a tool both come back as
    /// error envelopes.
    pub async fn dispatch(&self, request: InvocationRequest, ctx: &ToolContext) -> ToolResponse {
        let InvocationRequest { tool_name, arguments } = request;

        let Some(tool) = self.get(&tool_name) else {
            log::warn!("unknown_tool tool={}", tool_name);
            return ToolResponse::error(tool_name.clone(), format!("Unknown tool: {}", tool_name));
        };

        log::info!("tool_called tool={}", tool_name);
        let span = tracing::info_span!("tool_call", tool = %tool_name);

        match AssertUnwindSafe(tool.execute(arguments, ctx))
            .catch_unwind()
            .instrument(span)
            .await
        {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %tool_name, error = %message, "tool execution panicked");
                ToolResponse::error(tool_name.clone(), format!("Tool '{}' failed: {}", tool_name, message))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{Invoker, RetryPolicy};
    use crate::maps::MockMapsApi;
    use crate::tools::{Limits, ToolError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn description(&self) -> &'static str {
            "Always panics"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn run(&self, _input: &Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            panic!("index out of bounds")
        }
    }

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "get_directions"
        }

        fn description(&self) -> &'static str {
            self.0
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn run(&self, input: &Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            Ok(input.clone())
        }
    }

    fn test_context() -> ToolContext {
        let invoker = Invoker::new(Arc::new(MockMapsApi::new()), RetryPolicy::default(), 2);
        ToolContext::new(invoker, Limits::default())
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = ToolRegistry::standard();
        assert_eq!(
            registry.tool_names(),
            vec![
                "search_places",
                "get_place_details",
                "get_directions",
                "geocode_address",
                "reverse_geocode",
                "calculate_distance_matrix",
                "snap_to_roads",
                "get_speed_limits",
                "get_traffic_conditions",
                "calculate_route_safety_factors",
                "get_route_elevation_gain",
            ]
        );
    }

    #[test]
    fn test_definitions_are_complete() {
        let registry = ToolRegistry::standard();
        let defs = registry.definitions();

        assert_eq!(defs.len(), 11);
        for def in &defs {
            assert!(!def.description.is_empty(), "{} has no description", def.name);
            assert_eq!(def.input_schema["type"], "object", "{} schema is not an object", def.name);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let registry = ToolRegistry::standard();
        let mut names = registry.tool_names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), registry.len());
    }

    #[test]
    fn test_add_tool_replaces_in_place() {
        let mut registry = ToolRegistry::standard();
        registry.add_tool(Box::new(EchoTool("replacement")));

        assert_eq!(registry.len(), 11);
        assert_eq!(registry.tool_names()[2], "get_directions");
        assert_eq!(registry.definitions()[2].description, "replacement");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::standard();
        let response = registry
            .dispatch(InvocationRequest::new("teleport", json!({})), &test_context())
            .await;

        assert!(!response.is_success());
        assert_eq!(response.tool(), "teleport");
        assert_eq!(response.error_message(), Some("Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn test_dispatch_contains_panics() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(Box::new(PanickingTool));

        let response = registry
            .dispatch(InvocationRequest::new("panicking", json!({})), &test_context())
            .await;

        assert!(!response.is_success());
        let message = response.error_message().unwrap();
        assert!(message.contains("panicking"));
        assert!(message.contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_dispatch_routes_arguments() {
        let mut registry = ToolRegistry::new();
        registry.add_tool(Box::new(EchoTool("echo")));

        let response = registry
            .dispatch(InvocationRequest::new("get_directions", json!({"origin": "A"})), &test_context())
            .await;

        assert_eq!(response, ToolResponse::success("get_directions", json!({"origin": "A"})));
    }

    #[tokio::test]
    async fn test_missing_arguments_never_raise() {
        let registry = ToolRegistry::standard();
        let ctx = test_context();

        for name in registry.tool_names() {
            let response = registry.dispatch(InvocationRequest::new(name, json!({})), &ctx).await;
            assert!(!response.is_success(), "{} accepted empty arguments", name);
            assert!(!response.error_message().unwrap().is_empty());
        }
    }
}
