//! calculate_route_safety_factors tool
//!
//! One directions call for the route and traffic, then a best-effort
//! snap + speed-limit lookup over sampled step starts. The road lookup may
//! fail without failing the assessment; the scorer treats it as Unknown.

use async_trait::async_trait;
use chrono::Timelike;
use serde_json::{Value, json};

use super::args::{departure_time, optional_choice, required_str};
use super::routes::{TRAFFIC_MODELS, first_route};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{DirectionsRequest, Endpoint, MapsError};
use crate::model::{LatLng, RouteLeg, SnappedPoint, SpeedLimit, decode_all};
use crate::scoring::{SafetyInputs, assess_route};

/// Step starts sampled for the speed-limit lookup
const MAX_SAMPLE_POINTS: usize = 50;

pub struct CalculateRouteSafetyFactorsTool;

#[async_trait]
impl Tool for CalculateRouteSafetyFactorsTool {
    fn name(&self) -> &'static str {
        "calculate_route_safety_factors"
    }

    fn description(&self) -> &'static str {
        "Calculate safety assessment for a route. Analyzes traffic congestion, road types, and speed limits to identify risk factors."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Starting location"
                },
                "destination": {
                    "type": "string",
                    "description": "Ending location"
                },
                "departure_time": {
                    "type": "string",
                    "description": "ISO 8601 timestamp for departure (defaults to now)"
                },
                "traffic_model": {
                    "type": "string",
                    "enum": TRAFFIC_MODELS,
                    "default": "pessimistic",
                    "description": "Traffic prediction model (defaults to pessimistic for safety analysis)"
                }
            },
            "required": ["origin", "destination"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let origin = required_str(input, "origin")?;
        let destination = required_str(input, "destination")?;
        let traffic_model = optional_choice(input, "traffic_model", TRAFFIC_MODELS, "pessimistic")?;
        let departure = departure_time(input)?;

        log::info!(
            "calculating_route_safety origin={} destination={} traffic_model={}",
            origin,
            destination,
            traffic_model
        );

        let request = DirectionsRequest::new(origin, destination)
            .with_departure_time(departure)
            .with_traffic_model(traffic_model);
        let (route, leg) = first_route(ctx, request).await?;

        let speed_limits = match road_speed_limits(ctx, &leg).await {
            Ok(limits) => Some(limits),
            Err(MapsError::Cancelled) => return Err(MapsError::Cancelled.into()),
            Err(e) => {
                log::warn!("speed_limit_check_failed_continuing error={}", e);
                None
            }
        };

        let assessment = assess_route(&SafetyInputs {
            duration_secs: leg.duration.value,
            duration_in_traffic_secs: leg.traffic_duration().value,
            speed_limits,
            departure_hour: departure.hour(),
        });

        log::info!(
            "route_safety_calculated score={} risk_level={:?}",
            assessment.safety_score,
            assessment.risk_level
        );

        Ok(json!({
            "safety_score": assessment.safety_score,
            "risk_level": assessment.risk_level,
            "details": assessment.details,
            "risk_factors": assessment.risk_factors,
            "route_summary": route.summary,
            "traffic_model_used": traffic_model
        }))
    }
}

/// Posted limits (km/h) along the leg's sampled step starts
async fn road_speed_limits(ctx: &ToolContext, leg: &RouteLeg) -> Result<Vec<f64>, MapsError> {
    let samples: Vec<LatLng> = leg
        .steps
        .iter()
        .filter_map(|step| step.start_location)
        .take(MAX_SAMPLE_POINTS)
        .collect();
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let snapped: Vec<SnappedPoint> =
        decode_all(ctx.call(Endpoint::SnapToRoads, move |api| api.snap_to_roads(&samples, true)).await?)?;
    let place_ids: Vec<String> = snapped
        .into_iter()
        .map(|p| p.place_id)
        .filter(|id| !id.is_empty())
        .take(MAX_SAMPLE_POINTS)
        .collect();
    if place_ids.is_empty() {
        return Ok(Vec::new());
    }

    let limits: Vec<SpeedLimit> =
        decode_all(ctx.call(Endpoint::SpeedLimits, move |api| api.speed_limits(&place_ids)).await?)?;
    Ok(limits.into_iter().filter_map(|l| l.speed_limit).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{Invoker, RetryPolicy};
    use crate::maps::{MockCall, MockMapsApi};
    use crate::tools::Limits;
    use std::sync::Arc;

    fn context(mock: Arc<MockMapsApi>) -> ToolContext {
        ToolContext::new(Invoker::new(mock, RetryPolicy::default(), 2), Limits::default())
    }

    fn route(duration: u64, in_traffic: u64, steps: usize) -> Value {
        let steps: Vec<Value> = (0..steps)
            .map(|i| json!({"start_location": {"lat": 37.0 + i as f64 * 0.001, "lng": -122.0}}))
            .collect();
        json!([{
            "summary": "US-101",
            "legs": [{
                "duration": {"text": "", "value": duration},
                "duration_in_traffic": {"text": "", "value": in_traffic},
                "steps": steps
            }]
        }])
    }

    fn input(departure: &str) -> Value {
        json!({"origin": "A", "destination": "B", "departure_time": departure})
    }

    #[tokio::test]
    async fn test_safe_daytime_route() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route(1000, 1050, 3))
                .with_response(Endpoint::SnapToRoads, json!([{"placeId": "p1"}, {"placeId": "p2"}]))
                .with_response(
                    Endpoint::SpeedLimits,
                    json!([{"placeId": "p1", "speedLimit": 40}, {"placeId": "p2", "speedLimit": 50}]),
                ),
        );

        let data = CalculateRouteSafetyFactorsTool
            .run(&input("2024-05-01T12:00:00Z"), &context(mock))
            .await
            .unwrap();

        assert_eq!(data["safety_score"], 96.0);
        assert_eq!(data["risk_level"], "Low");
        assert_eq!(data["details"]["traffic_risk"], "Low");
        assert_eq!(data["details"]["road_risk"], "Low Speed");
        assert_eq!(data["details"]["time_risk"], "Day");
        assert_eq!(data["details"]["max_speed_limit_kmh"], 50.0);
        assert_eq!(data["risk_factors"], json!([]));
        assert_eq!(data["route_summary"], "US-101");
        assert_eq!(data["traffic_model_used"], "pessimistic");
    }

    #[tokio::test]
    async fn test_risky_night_route() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route(1000, 1500, 2))
                .with_response(Endpoint::SnapToRoads, json!([{"placeId": "p1"}]))
                .with_response(Endpoint::SpeedLimits, json!([{"placeId": "p1", "speedLimit": 120}])),
        );

        let data = CalculateRouteSafetyFactorsTool
            .run(&input("2024-05-01T02:00:00Z"), &context(mock))
            .await
            .unwrap();

        assert_eq!(data["safety_score"], 52.0);
        assert_eq!(data["risk_level"], "High");
        assert_eq!(
            data["risk_factors"],
            json!([
                "Traffic: High congestion",
                "Road: High speed limit (120 km/h)",
                "Conditions: Night driving"
            ])
        );
    }

    #[tokio::test]
    async fn test_hour_taken_from_departure_offset() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, route(1000, 1000, 0)));

        // 23:00 at -07:00 is 06:00 UTC, still night locally
        let data = CalculateRouteSafetyFactorsTool
            .run(&input("2024-05-01T23:00:00-07:00"), &context(mock))
            .await
            .unwrap();
        assert_eq!(data["details"]["time_risk"], "Night");
    }

    #[tokio::test]
    async fn test_road_lookup_failure_degrades() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route(1000, 1050, 3))
                .with_error(Endpoint::SnapToRoads, MapsError::api("PERMISSION_DENIED", None)),
        );

        let response = CalculateRouteSafetyFactorsTool
            .execute(input("2024-05-01T12:00:00Z"), &context(mock.clone()))
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["details"]["road_risk"], "Unknown");
        assert_eq!(data["details"]["max_speed_limit_kmh"], Value::Null);
        assert_eq!(data["safety_score"], 80.0);
        assert_eq!(mock.call_count(Endpoint::SpeedLimits), 0);
    }

    #[tokio::test]
    async fn test_samples_capped() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route(1000, 1000, 80))
                .with_response(Endpoint::SnapToRoads, json!([])),
        );

        CalculateRouteSafetyFactorsTool
            .run(&input("2024-05-01T12:00:00Z"), &context(mock.clone()))
            .await
            .unwrap();

        let snap = mock
            .calls()
            .into_iter()
            .find_map(|call| match call {
                MockCall::SnapToRoads { path, interpolate } => Some((path, interpolate)),
                _ => None,
            })
            .unwrap();
        assert_eq!(snap.0.len(), MAX_SAMPLE_POINTS);
        assert!(snap.1);
    }

    #[tokio::test]
    async fn test_directions_failure_is_fatal() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, json!([])));
        let response = CalculateRouteSafetyFactorsTool
            .execute(input("2024-05-01T12:00:00Z"), &context(mock))
            .await;
        assert_eq!(response.error_message(), Some("No route found"));
    }
}
