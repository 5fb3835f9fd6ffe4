//! get_route_elevation_gain tool - elevation profile along a route's overview polyline

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use super::args::{optional_choice, optional_u64, required_str};
use super::routes::first_route;
use super::{Tool, ToolContext, ToolError};
use crate::maps::{DirectionsRequest, Endpoint};
use crate::model::{ElevationSample, decode_all};
use crate::scoring::round1;

const MODES: &[&str] = &["driving", "walking", "bicycling"];
const DEFAULT_SAMPLES: u64 = 50;
/// Elevation API limit per request
const MAX_SAMPLES: u64 = 512;

pub struct GetRouteElevationGainTool;

#[async_trait]
impl Tool for GetRouteElevationGainTool {
    fn name(&self) -> &'static str {
        "get_route_elevation_gain"
    }

    fn description(&self) -> &'static str {
        "Calculate elevation gain and retrieve elevation profile for a route. Useful for cycling, hiking, or fuel efficiency analysis."
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
                    "enum": MODES,
                    "default": "bicycling",
                    "description": "Travel mode (elevation is most relevant for bicycling/walking)"
                },
                "samples": {
                    "type": "integer",
                    "default": DEFAULT_SAMPLES,
                    "description": "Number of elevation samples along the route (max 512)"
                }
            },
            "required": ["origin", "destination"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let origin = required_str(input, "origin")?;
        let destination = required_str(input, "destination")?;
        let mode = optional_choice(input, "mode", MODES, "bicycling")?;
        let samples = optional_u64(input, "samples")?.unwrap_or(DEFAULT_SAMPLES).min(MAX_SAMPLES);
        if samples == 0 {
            return Err(ToolError::invalid("Argument 'samples' must be at least 1"));
        }

        log::info!(
            "calculating_elevation_gain origin={} destination={} mode={} samples={}",
            origin,
            destination,
            mode,
            samples
        );

        let (route, leg) = first_route(ctx, DirectionsRequest::new(origin, destination).with_mode(mode)).await?;
        let polyline = route
            .overview_polyline
            .as_ref()
            .map(|p| p.points.clone())
            .filter(|points| !points.is_empty())
            .ok_or_else(|| ToolError::not_found("Route has no overview polyline"))?;

        let raw = ctx
            .call(Endpoint::Elevation, move |api| {
                api.elevation_along_path(&polyline, samples as u32)
            })
            .await?;
        let elevations: Vec<f64> = decode_all::<ElevationSample>(raw)?
            .into_iter()
            .map(|s| s.elevation)
            .collect();

        let profile = ElevationProfile::from_samples(&elevations)
            .ok_or_else(|| ToolError::not_found("No elevation data returned for route"))?;

        log::info!("elevation_calculated gain={}", profile.stats.total_gain_meters);

        Ok(json!({
            "route_summary": route.summary,
            "total_distance": leg.distance.text,
            "elevation_stats": profile.stats,
            "elevation_profile": profile.points
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationStats {
    pub total_gain_meters: f64,
    pub total_loss_meters: f64,
    pub max_elevation_meters: f64,
    pub min_elevation_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePoint {
    /// Position along the route, 0..=100, floored
    pub distance_percentage: u32,
    pub elevation_meters: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElevationProfile {
    pub stats: ElevationStats,
    pub points: Vec<ProfilePoint>,
}

impl ElevationProfile {
    /// Summarize evenly spaced samples; `None` when there are none
    pub fn from_samples(elevations: &[f64]) -> Option<Self> {
        let first = *elevations.first()?;
        let last_index = elevations.len() - 1;

        let (mut gain, mut loss) = (0.0, 0.0);
        for pair in elevations.windows(2) {
            let diff = pair[1] - pair[0];
            if diff > 0.0 {
                gain += diff;
            } else {
                loss -= diff;
            }
        }

        let max = elevations.iter().copied().fold(first, f64::max);
        let min = elevations.iter().copied().fold(first, f64::min);

        let points = elevations
            .iter()
            .enumerate()
            .map(|(i, elevation)| ProfilePoint {
                distance_percentage: if last_index == 0 {
                    0
                } else {
                    (i * 100 / last_index) as u32
                },
                elevation_meters: round1(*elevation),
            })
            .collect();

        Some(Self {
            stats: ElevationStats {
                total_gain_meters: round1(gain),
                total_loss_meters: round1(loss),
                max_elevation_meters: round1(max),
                min_elevation_meters: round1(min),
            },
            points,
        })
    }
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

    fn route() -> Value {
        json!([{
            "summary": "Hill Rd",
            "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC"},
            "legs": [{"distance": {"text": "5.2 km", "value": 5200}}]
        }])
    }

    #[test]
    fn test_profile_stats() {
        let profile = ElevationProfile::from_samples(&[100.0, 110.26, 105.0, 120.0]).unwrap();
        assert_eq!(profile.stats.total_gain_meters, 25.3);
        assert_eq!(profile.stats.total_loss_meters, 5.3);
        assert_eq!(profile.stats.max_elevation_meters, 120.0);
        assert_eq!(profile.stats.min_elevation_meters, 100.0);

        let percentages: Vec<u32> = profile.points.iter().map(|p| p.distance_percentage).collect();
        assert_eq!(percentages, vec![0, 33, 66, 100]);
        assert_eq!(profile.points[1].elevation_meters, 110.3);
    }

    #[test]
    fn test_profile_single_sample() {
        let profile = ElevationProfile::from_samples(&[42.0]).unwrap();
        assert_eq!(profile.points.len(), 1);
        assert_eq!(profile.points[0].distance_percentage, 0);
        assert_eq!(profile.stats.total_gain_meters, 0.0);
    }

    #[test]
    fn test_profile_empty() {
        assert!(ElevationProfile::from_samples(&[]).is_none());
    }

    #[tokio::test]
    async fn test_elevation_gain() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route())
                .with_response(
                    Endpoint::Elevation,
                    json!([{"elevation": 10.0}, {"elevation": 30.0}, {"elevation": 20.0}]),
                ),
        );
        let ctx = context(mock.clone());

        let data = GetRouteElevationGainTool
            .run(&json!({"origin": "A", "destination": "B", "samples": 9000}), &ctx)
            .await
            .unwrap();

        assert_eq!(data["route_summary"], "Hill Rd");
        assert_eq!(data["total_distance"], "5.2 km");
        assert_eq!(data["elevation_stats"]["total_gain_meters"], 20.0);
        assert_eq!(data["elevation_stats"]["total_loss_meters"], 10.0);
        assert_eq!(data["elevation_profile"][2], json!({"distance_percentage": 100, "elevation_meters": 20.0}));

        let calls = mock.calls();
        let MockCall::Directions(request) = &calls[0] else {
            panic!("expected a directions call");
        };
        assert_eq!(request.mode, "bicycling");
        assert_eq!(
            calls[1],
            MockCall::Elevation {
                encoded_polyline: "_p~iF~ps|U_ulLnnqC".to_string(),
                samples: 512
            }
        );
    }

    #[tokio::test]
    async fn test_empty_elevation_is_error() {
        let mock = Arc::new(
            MockMapsApi::new()
                .with_response(Endpoint::Directions, route())
                .with_response(Endpoint::Elevation, json!([])),
        );

        let response = GetRouteElevationGainTool
            .execute(json!({"origin": "A", "destination": "B"}), &context(mock))
            .await;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_no_route() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, json!([])));
        let response = GetRouteElevationGainTool
            .execute(json!({"origin": "A", "destination": "B"}), &context(mock.clone()))
            .await;

        assert_eq!(response.error_message(), Some("No route found"));
        assert_eq!(mock.call_count(Endpoint::Elevation), 0);
    }
}
