//! geocode_address tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{optional_str, required_str, string_map};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{Endpoint, GeocodeRequest};

pub struct GeocodeAddressTool;

#[async_trait]
impl Tool for GeocodeAddressTool {
    fn name(&self) -> &'static str {
        "geocode_address"
    }

    fn description(&self) -> &'static str {
        "Convert a street address to geographic coordinates (latitude/longitude)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "string",
                    "description": "Street address to geocode"
                },
                "components": {
                    "type": "object",
                    "description": "Component filters (e.g., {'country': 'US'})"
                },
                "region": {
                    "type": "string",
                    "description": "Region bias (ISO 3166-1 country code)"
                }
            },
            "required": ["address"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let request = GeocodeRequest {
            address: required_str(input, "address")?.to_string(),
            components: string_map(input, "components")?,
            region: optional_str(input, "region")?.map(String::from),
        };

        log::info!("geocoding_address address={}", request.address);

        let results = ctx.call(Endpoint::Geocode, move |api| api.geocode(&request)).await?;
        let first = results
            .first()
            .ok_or_else(|| ToolError::not_found("No results found for address"))?;

        log::info!("geocoding_success formatted_address={}", first["formatted_address"]);

        Ok(json!({
            "formatted_address": first["formatted_address"],
            "location": first["geometry"]["location"],
            "place_id": first["place_id"],
            "types": first["types"],
            "address_components": first["address_components"]
        }))
    }
}
