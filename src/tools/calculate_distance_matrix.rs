//! calculate_distance_matrix tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{optional_choice, required_string_list};
use super::get_directions::{AVOIDABLE, TRAVEL_MODES, avoid_list};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{DistanceMatrixRequest, Endpoint};

/// Distance Matrix API limit per side
const MAX_LOCATIONS: usize = 25;
const UNITS: &[&str] = &["metric", "imperial"];

pub struct CalculateDistanceMatrixTool;

#[async_trait]
impl Tool for CalculateDistanceMatrixTool {
    fn name(&self) -> &'static str {
        "calculate_distance_matrix"
    }

    fn description(&self) -> &'static str {
        "Calculate travel distances and times between multiple origins and destinations. Useful for route optimization and fleet management."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origins": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "List of origin locations (addresses or 'lat,lng')",
                    "minItems": 1,
                    "maxItems": MAX_LOCATIONS
                },
                "destinations": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "List of destination locations (addresses or 'lat,lng')",
                    "minItems": 1,
                    "maxItems": MAX_LOCATIONS
                },
                "mode": {
                    "type": "string",
                    "enum": TRAVEL_MODES,
                    "default": "driving",
                    "description": "Travel mode"
                },
                "avoid": {
                    "type": "array",
                    "items": {"type": "string", "enum": AVOIDABLE},
                    "description": "Features to avoid"
                },
                "units": {
                    "type": "string",
                    "enum": UNITS,
                    "default": "metric",
                    "description": "Unit system for distances"
                }
            },
            "required": ["origins", "destinations"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let request = DistanceMatrixRequest {
            origins: required_string_list(input, "origins", 1, MAX_LOCATIONS)?,
            destinations: required_string_list(input, "destinations", 1, MAX_LOCATIONS)?,
            mode: optional_choice(input, "mode", TRAVEL_MODES, "driving")?.to_string(),
            avoid: avoid_list(input)?,
            units: optional_choice(input, "units", UNITS, "metric")?.to_string(),
        };
        let (origins, destinations) = (request.origins.len(), request.destinations.len());

        log::info!(
            "calculating_distance_matrix num_origins={} num_destinations={} mode={}",
            origins,
            destinations,
            request.mode
        );

        let body = ctx
            .call(Endpoint::DistanceMatrix, move |api| api.distance_matrix(&request))
            .await?;
        let matrix = reduce_matrix(&body);

        log::info!("distance_matrix_calculated total_routes={}", origins * destinations);
        Ok(json!({"matrix": matrix, "origins": origins, "destinations": destinations}))
    }
}

/// One row per origin, one cell per destination
fn reduce_matrix(body: &Value) -> Vec<Vec<Value>> {
    let empty = Vec::new();
    let rows = body["rows"].as_array().unwrap_or(&empty);

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let elements = row["elements"].as_array().unwrap_or(&empty);
            elements
                .iter()
                .enumerate()
                .map(|(j, element)| reduce_cell(&body["origin_addresses"][i], &body["destination_addresses"][j], element))
                .collect()
        })
        .collect()
}

fn reduce_cell(origin: &Value, destination: &Value, element: &Value) -> Value {
    let status = element["status"].as_str().unwrap_or("UNKNOWN_ERROR");
    if status == "OK" {
        json!({
            "origin": origin,
            "destination": destination,
            "distance": element["distance"]["text"],
            "distance_meters": element["distance"]["value"],
            "duration": element["duration"]["text"],
            "duration_seconds": element["duration"]["value"],
            "status": "OK"
        })
    } else {
        json!({
            "origin": origin,
            "destination": destination,
            "status": status,
            "error": format!("Could not calculate route: {}", status)
        })
    }
}
