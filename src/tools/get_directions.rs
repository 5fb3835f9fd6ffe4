//! get_directions tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{optional_bool, optional_choice, optional_str, parse_departure_time, required_str, string_list};
use super::routes::{TRAFFIC_MODELS, fetch_routes};
use super::{Tool, ToolContext, ToolError};
use crate::maps::DirectionsRequest;
use crate::model::{Route, RouteStep};

pub const TRAVEL_MODES: &[&str] = &["driving", "walking", "bicycling", "transit"];
pub const AVOIDABLE: &[&str] = &["tolls", "highways", "ferries", "indoor"];

pub struct GetDirectionsTool;

#[async_trait]
impl Tool for GetDirectionsTool {
    fn name(&self) -> &'static str {
        "get_directions"
    }

    fn description(&self) -> &'static str {
        "Get route directions between origin and destination with real-time traffic data. Returns routes with distance, duration, steps, and traffic information."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Starting location (address or 'lat,lng')"
                },
                "destination": {
                    "type": "string",
                    "description": "Ending location (address or 'lat,lng')"
                },
                "mode": {
                    "type": "string",
                    "enum": TRAVEL_MODES,
                    "default": "driving",
                    "description": "Travel mode"
                },
                "departure_time": {
                    "type": "string",
                    "description": "ISO 8601 timestamp for departure (for traffic estimation)"
                },
                "alternatives": {
                    "type": "boolean",
                    "default": true,
                    "description": "Return alternative routes"
                },
                "avoid": {
                    "type": "array",
                    "items": {"type": "string", "enum": AVOIDABLE},
                    "description": "Features to avoid"
                },
                "traffic_model": {
                    "type": "string",
                    "enum": TRAFFIC_MODELS,
                    "default": "best_guess",
                    "description": "Traffic prediction model"
                }
            },
            "required": ["origin", "destination"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let origin = required_str(input, "origin")?;
        let destination = required_str(input, "destination")?;
        let mode = optional_choice(input, "mode", TRAVEL_MODES, "driving")?;
        let alternatives = optional_bool(input, "alternatives", true)?;
        let avoid = avoid_list(input)?;
        let traffic_model = optional_choice(input, "traffic_model", TRAFFIC_MODELS, "best_guess")?;

        let departure_time = match optional_str(input, "departure_time")? {
            Some(text) => Some(parse_departure_time(text)?),
            None if mode == "driving" => Some(chrono::Local::now().fixed_offset()),
            None => None,
        };

        log::info!(
            "getting_directions origin={} destination={} mode={} departure_time={:?}",
            origin,
            destination,
            mode,
            departure_time.map(|t| t.to_rfc3339())
        );

        let mut request = DirectionsRequest::new(origin, destination).with_mode(mode);
        request.alternatives = alternatives;
        request.avoid = avoid;
        request.departure_time = departure_time;
        if mode == "driving" {
            request = request.with_traffic_model(traffic_model);
        }

        let routes: Vec<Value> = fetch_routes(ctx, request).await?.iter().filter_map(reduce_route).collect();

        log::info!("directions_found num_routes={}", routes.len());
        Ok(json!({"count": routes.len(), "routes": routes}))
    }
}

/// `avoid` list, restricted to features the API understands
pub(super) fn avoid_list(input: &Value) -> Result<Vec<String>, ToolError> {
    let avoid = string_list(input, "avoid")?;
    if let Some(bad) = avoid.iter().find(|a| !AVOIDABLE.contains(&a.as_str())) {
        return Err(ToolError::invalid(format!(
            "Cannot avoid '{}': expected one of {}",
            bad,
            AVOIDABLE.join(", ")
        )));
    }
    Ok(avoid)
}

/// Reduce a route to its first leg; routes without legs are dropped
fn reduce_route(route: &Route) -> Option<Value> {
    let leg = route.first_leg()?;
    Some(json!({
        "summary": route.summary,
        "distance": leg.distance.text,
        "distance_meters": leg.distance.value,
        "duration": leg.duration.text,
        "duration_seconds": leg.duration.value,
        "duration_in_traffic": leg.duration_in_traffic.as_ref().map(|d| d.text.clone()),
        "start_address": leg.start_address,
        "end_address": leg.end_address,
        "start_location": leg.start_location,
        "end_location": leg.end_location,
        "steps": leg.steps.iter().map(reduce_step).collect::<Vec<_>>(),
        "warnings": route.warnings
    }))
}

fn reduce_step(step: &RouteStep) -> Value {
    json!({
        "instruction": clean_instruction(&step.html_instructions),
        "distance": step.distance.text,
        "duration": step.duration.text
    })
}

/// Drop bold tags and break before nested `<div>` notes
pub fn clean_instruction(html: &str) -> String {
    html.replace("<b>", "").replace("</b>", "").replace("<div", "\n<div")
}
