//! get_traffic_conditions tool - congestion estimate for a driving route

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{departure_time, optional_choice, required_str};
use super::routes::{TRAFFIC_MODELS, first_route};
use super::{Tool, ToolContext, ToolError};
use crate::maps::DirectionsRequest;
use crate::scoring::classify_congestion;

pub struct GetTrafficConditionsTool;

#[async_trait]
impl Tool for GetTrafficConditionsTool {
    fn name(&self) -> &'static str {
        "get_traffic_conditions"
    }

    fn description(&self) -> &'static str {
        "Analyze real-time traffic conditions between origin and destination. Returns duration in traffic, delay estimates, and congestion level."
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
                "departure_time": {
                    "type": "string",
                    "description": "ISO 8601 timestamp for departure (defaults to now)"
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
        let traffic_model = optional_choice(input, "traffic_model", TRAFFIC_MODELS, "best_guess")?;
        let departure = departure_time(input)?;

        log::info!(
            "analyzing_traffic origin={} destination={} departure_time={} traffic_model={}",
            origin,
            destination,
            departure.to_rfc3339(),
            traffic_model
        );

        let request = DirectionsRequest::new(origin, destination)
            .with_departure_time(departure)
            .with_traffic_model(traffic_model);
        let (route, leg) = first_route(ctx, request).await?;

        let in_traffic = leg.traffic_duration();
        let analysis = classify_congestion(leg.duration.value, in_traffic.value);

        log::info!(
            "traffic_analyzed congestion={} delay_secs={}",
            analysis.level,
            analysis.delay_secs
        );

        Ok(json!({
            "route_summary": route.summary,
            "normal_duration": leg.duration.text,
            "traffic_duration": in_traffic.text,
            "delay_minutes": analysis.delay_minutes,
            "congestion_level": analysis.level,
            "distance": leg.distance.text,
            "start_address": leg.start_address,
            "end_address": leg.end_address,
            "traffic_model_used": traffic_model
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{Invoker, RetryPolicy};
    use crate::maps::{Endpoint, MockCall, MockMapsApi};
    use crate::tools::Limits;
    use std::sync::Arc;

    fn context(mock: Arc<MockMapsApi>) -> ToolContext {
        ToolContext::new(Invoker::new(mock, RetryPolicy::default(), 2), Limits::default())
    }

    fn route(duration: u64, in_traffic: Option<u64>) -> Value {
        let mut leg = json!({
            "distance": {"text": "10 km", "value": 10000},
            "duration": {"text": format!("{} s", duration), "value": duration},
            "start_address": "Start",
            "end_address": "End",
            "steps": []
        });
        if let Some(secs) = in_traffic {
            leg["duration_in_traffic"] = json!({"text": format!("{} s", secs), "value": secs});
        }
        json!([{"summary": "Main St", "legs": [leg]}])
    }

    async fn run_with(payload: Value) -> Value {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, payload));
        GetTrafficConditionsTool
            .run(&json!({"origin": "A", "destination": "B"}), &context(mock))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_light_traffic() {
        let data = run_with(route(1000, Some(1050))).await;
        assert_eq!(data["congestion_level"], "Low");
        assert_eq!(data["delay_minutes"], 0.8);
        assert_eq!(data["normal_duration"], "1000 s");
        assert_eq!(data["traffic_duration"], "1050 s");
        assert_eq!(data["traffic_model_used"], "best_guess");
    }

    #[tokio::test]
    async fn test_heavy_traffic() {
        let data = run_with(route(1000, Some(1400))).await;
        assert_eq!(data["congestion_level"], "Heavy");
        assert_eq!(data["delay_minutes"], 6.7);
    }

    #[tokio::test]
    async fn test_missing_traffic_duration_means_no_delay() {
        let data = run_with(route(1000, None)).await;
        assert_eq!(data["congestion_level"], "Low");
        assert_eq!(data["delay_minutes"], 0.0);
        assert_eq!(data["traffic_duration"], "1000 s");
    }

    #[tokio::test]
    async fn test_no_route() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, json!([])));
        let response = GetTrafficConditionsTool
            .execute(json!({"origin": "A", "destination": "B"}), &context(mock))
            .await;
        assert_eq!(response.error_message(), Some("No route found"));
    }

    #[tokio::test]
    async fn test_request_uses_traffic_model() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::Directions, route(600, Some(700))));
        let ctx = context(mock.clone());

        GetTrafficConditionsTool
            .run(
                &json!({"origin": "A", "destination": "B", "traffic_model": "optimistic", "departure_time": "2024-03-01T08:00:00-08:00"}),
                &ctx,
            )
            .await
            .unwrap();

        let MockCall::Directions(request) = &mock.calls()[0] else {
            panic!("expected a directions call");
        };
        assert_eq!(request.mode, "driving");
        assert_eq!(request.traffic_model.as_deref(), Some("optimistic"));
        assert_eq!(request.departure_time.unwrap().to_rfc3339(), "2024-03-01T08:00:00-08:00");
    }
}
