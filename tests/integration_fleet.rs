//! End-to-end fleet workflow tests
//!
//! Drives the public API the way the binary does, with a scripted Maps
//! backend in place of the HTTP client.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use gmaps_mcp::invoker::{Invoker, RetryPolicy};
use gmaps_mcp::maps::{Endpoint, MapsError, MockCall, MockMapsApi};
use gmaps_mcp::scoring::Severity;
use gmaps_mcp::server::McpServer;
use gmaps_mcp::tools::{InvocationRequest, Limits, ToolContext, ToolRegistry};
use gmaps_mcp::trace::{TraceAnalyzer, load_trace};
use serde_json::{Value, json};
use tempfile::TempDir;

fn context(mock: Arc<MockMapsApi>) -> ToolContext {
    ToolContext::new(Invoker::new(mock, RetryPolicy::default(), 4), Limits::default())
}

fn commute() -> Value {
    json!([{
        "summary": "I-280 S",
        "legs": [{
            "distance": {"text": "45.1 km", "value": 45100},
            "duration": {"text": "35 mins", "value": 2100},
            "duration_in_traffic": {"text": "52 mins", "value": 3120},
            "start_address": "San Francisco, CA",
            "end_address": "Palo Alto, CA",
            "steps": []
        }]
    }])
}

async fn run_session(ctx: ToolContext, input: &str) -> HashMap<String, Value> {
    let server = McpServer::new(ToolRegistry::standard(), ctx);
    let output = server.serve(input.as_bytes(), Vec::new()).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| {
            let response: Value = serde_json::from_str(line).unwrap();
            (response["id"].to_string(), response)
        })
        .collect()
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

    for definition in registry.definitions() {
        let schema = definition.to_rpc_schema();
        assert_eq!(schema["inputSchema"]["type"], "object", "{}", definition.name);
        assert!(!definition.description.is_empty());
    }
}

#[tokio::test]
async fn test_stdio_session_end_to_end() {
    let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, commute()));
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_traffic_conditions","arguments":{"origin":"San Francisco","destination":"Palo Alto"}}}"#,
        r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"reverse_geocode","arguments":{"lat":95,"lng":0}}}"#,
        r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#,
    ]
    .join("\n");

    let responses = run_session(context(mock.clone()), &input).await;
    assert_eq!(responses.len(), 5);

    assert_eq!(responses["1"]["result"]["serverInfo"]["name"], "gmaps-mcp");
    assert_eq!(responses["2"]["result"]["tools"].as_array().unwrap().len(), 11);

    let traffic = &responses["3"]["result"];
    assert_eq!(traffic["isError"], false);
    let envelope: Value = serde_json::from_str(traffic["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["tool"], "get_traffic_conditions");
    assert_eq!(envelope["data"]["congestion_level"], "Heavy");
    assert_eq!(envelope["data"]["delay_minutes"], 17.0);
    assert_eq!(envelope["data"]["route_summary"], "I-280 S");

    let invalid = &responses["4"]["result"];
    assert_eq!(invalid["isError"], true);
    let envelope: Value = serde_json::from_str(invalid["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(envelope["status"], "error");
    assert!(envelope["error"].as_str().unwrap().starts_with("Invalid argument"));

    assert_eq!(responses["5"]["error"]["code"], -32601);

    // Only the traffic call reached the backend
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_api_errors_surface_in_envelope() {
    let mock = Arc::new(MockMapsApi::new().with_error(
        Endpoint::Geocode,
        MapsError::api("REQUEST_DENIED", Some("The provided API key is invalid.".to_string())),
    ));
    let ctx = context(mock.clone());

    let response = ToolRegistry::standard()
        .dispatch(InvocationRequest::new("geocode_address", json!({"address": "Berlin"})), &ctx)
        .await;

    assert!(!response.is_success());
    assert_eq!(response.tool(), "geocode_address");
    assert_eq!(
        response.error_message(),
        Some("REQUEST_DENIED (The provided API key is invalid.)")
    );
    // Not retried
    assert_eq!(mock.call_count(Endpoint::Geocode), 1);
}

#[tokio::test]
async fn test_trace_file_compliance_report() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("truck-7.json");
    std::fs::write(
        &path,
        json!([
            {"lat": 40.7128, "lng": -74.0060, "speed": 48.0},
            {"lat": 40.7130, "lng": -74.0055, "speed": 80.0},
            {"lat": 40.7133, "lng": -74.0050, "speed": 62.0},
            {"lat": 40.7137, "lng": -74.0045}
        ])
        .to_string(),
    )
    .unwrap();

    let mock = Arc::new(
        MockMapsApi::new()
            .with_response(
                Endpoint::SnapToRoads,
                json!([
                    {"location": {"latitude": 40.7128, "longitude": -74.0060}, "originalIndex": 0, "placeId": "broadway"},
                    {"location": {"latitude": 40.7130, "longitude": -74.0055}, "originalIndex": 1, "placeId": "broadway"},
                    {"location": {"latitude": 40.7133, "longitude": -74.0050}, "originalIndex": 2, "placeId": "canal"},
                    {"location": {"latitude": 40.7137, "longitude": -74.0045}, "originalIndex": 3, "placeId": "canal"}
                ]),
            )
            .with_response(
                Endpoint::SpeedLimits,
                json!([
                    {"placeId": "broadway", "speedLimit": 50, "units": "KPH"},
                    {"placeId": "canal", "speedLimit": 40, "units": "KPH"}
                ]),
            ),
    );

    let trace = load_trace(&path).unwrap();
    assert_eq!(trace.len(), 4);

    let timestamp = DateTime::parse_from_rfc3339("2026-03-02T17:30:00-05:00").unwrap();
    let report = TraceAnalyzer::new(context(mock.clone()))
        .analyze(&trace, "truck-7", timestamp)
        .await
        .unwrap();

    assert_eq!(report.vehicle_id, "truck-7");
    assert_eq!(report.timestamp, timestamp);
    assert_eq!(report.trace_length, 4);
    assert_eq!(report.snapped_points, 4);

    // 80 in a 50 is +60%, 62 in a 40 is +55%
    assert_eq!(report.violations.len(), 2);
    assert!(report.violations.iter().all(|v| v.severity == Severity::Critical));
    assert_eq!(report.compliance_score, 40.0);
    assert!(!report.recommendations.is_empty());

    // One lookup for both segments
    assert_eq!(
        mock.calls()[1],
        MockCall::SpeedLimits(vec!["broadway".to_string(), "canal".to_string()])
    );
}
