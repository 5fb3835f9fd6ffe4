//! reverse_geocode tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{required_f64_in, string_list};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{Endpoint, ReverseGeocodeRequest};
use crate::model::LatLng;

pub struct ReverseGeocodeTool;

#[async_trait]
impl Tool for ReverseGeocodeTool {
    fn name(&self) -> &'static str {
        "reverse_geocode"
    }

    fn description(&self) -> &'static str {
        "Convert geographic coordinates (latitude/longitude) to a street address."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "lat": {
                    "type": "number",
                    "description": "Latitude",
                    "minimum": -90,
                    "maximum": 90
                },
                "lng": {
                    "type": "number",
                    "description": "Longitude",
                    "minimum": -180,
                    "maximum": 180
                },
                "result_type": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter by result types (e.g., ['street_address', 'route'])"
                }
            },
            "required": ["lat", "lng"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let lat = required_f64_in(input, "lat", -90.0, 90.0)?;
        let lng = required_f64_in(input, "lng", -180.0, 180.0)?;
        let request = ReverseGeocodeRequest {
            location: LatLng::new(lat, lng),
            result_types: string_list(input, "result_type")?,
        };

        log::info!("reverse_geocoding lat={} lng={}", lat, lng);

        let results = ctx
            .call(Endpoint::ReverseGeocode, move |api| api.reverse_geocode(&request))
            .await?;
        let first = results
            .first()
            .ok_or_else(|| ToolError::not_found("No results found for coordinates"))?;

        log::info!("reverse_geocoding_success address={}", first["formatted_address"]);

        Ok(json!({
            "formatted_address": first["formatted_address"],
            "place_id": first["place_id"],
            "types": first["types"],
            "address_components": first["address_components"]
        }))
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

    #[tokio::test]
    async fn test_reverse_geocode() {
        let mock = Arc::new(MockMapsApi::new().with_response(
            Endpoint::ReverseGeocode,
            json!([{
                "formatted_address": "277 Bedford Ave, Brooklyn, NY 11211, USA",
                "place_id": "ChIJd8BlQ2BZwokRAFUEcm_qrcA",
                "types": ["street_address"],
                "address_components": [{"long_name": "277", "types": ["street_number"]}]
            }]),
        ));
        let ctx = context(mock.clone());

        let data = ReverseGeocodeTool
            .run(&json!({"lat": 40.714224, "lng": -73.961452, "result_type": ["street_address"]}), &ctx)
            .await
            .unwrap();

        assert_eq!(data["formatted_address"], "277 Bedford Ave, Brooklyn, NY 11211, USA");
        assert_eq!(data["address_components"][0]["long_name"], "277");

        assert_eq!(
            mock.calls()[0],
            MockCall::ReverseGeocode(ReverseGeocodeRequest {
                location: LatLng::new(40.714224, -73.961452),
                result_types: vec!["street_address".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates() {
        let mock = Arc::new(MockMapsApi::new());
        let ctx = context(mock.clone());

        for input in [json!({"lat": 91, "lng": 0}), json!({"lat": 0, "lng": -180.5}), json!({"lat": "north", "lng": 0})] {
            let err = ReverseGeocodeTool.run(&input, &ctx).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArgument(_)), "{}", input);
        }
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_results() {
        let mock = Arc::new(MockMapsApi::new().with_response(Endpoint::ReverseGeocode, json!([])));
        let response = ReverseGeocodeTool
            .execute(json!({"lat": 0.0, "lng": 0.0}), &context(mock))
            .await;
        assert_eq!(response.error_message(), Some("No results found for coordinates"));
    }
}
