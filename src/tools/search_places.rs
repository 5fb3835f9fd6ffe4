//! search_places tool - nearby search filtered by keyword

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{optional_str, optional_u64, required_str};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{Endpoint, NearbySearchRequest};
use crate::model::LatLng;

/// Places API caps a nearby search at this many results
const MAX_RESULT_COUNT: u32 = 20;

pub struct SearchPlacesTool;

#[async_trait]
impl Tool for SearchPlacesTool {
    fn name(&self) -> &'static str {
        "search_places"
    }

    fn description(&self) -> &'static str {
        "Search for nearby places based on location and keywords. Returns place names, addresses, ratings, and other details."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Location as 'lat,lng' (e.g., '37.7749,-122.4194')"
                },
                "keyword": {
                    "type": "string",
                    "description": "Keyword to search for (e.g., 'gas station', 'restaurant')"
                },
                "radius": {
                    "type": "integer",
                    "default": 5000,
                    "description": "Search radius in meters (default: 5000, max: 50000)"
                },
                "type": {
                    "type": "string",
                    "description": "Place type (e.g., 'restaurant', 'gas_station', 'parking')"
                }
            },
            "required": ["location", "keyword"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let location_text = required_str(input, "location")?;
        let keyword = required_str(input, "keyword")?.to_string();
        let location = LatLng::parse(location_text)
            .ok_or_else(|| ToolError::invalid(format!("Invalid location '{}': expected 'lat,lng'", location_text)))?;

        let limits = *ctx.limits();
        let radius = optional_u64(input, "radius")?
            .unwrap_or(limits.default_radius_meters as u64)
            .min(limits.max_radius_meters as u64);
        let included_types: Vec<String> = optional_str(input, "type")?.map(String::from).into_iter().collect();

        log::info!(
            "searching_places location={} keyword={} radius={} type={:?}",
            location,
            keyword,
            radius,
            included_types.first()
        );

        let request = NearbySearchRequest {
            location,
            radius_meters: radius as f64,
            included_types,
            max_result_count: MAX_RESULT_COUNT.min(limits.max_results),
        };
        let raw = ctx.call(Endpoint::SearchNearby, move |api| api.search_nearby(&request)).await?;

        let places: Vec<Value> = raw
            .iter()
            .filter(|place| matches_keyword(place, &keyword))
            .take(limits.max_results as usize)
            .map(reduce_place)
            .collect();

        log::info!("places_found count={}", places.len());
        Ok(json!({"places": places, "count": places.len()}))
    }
}

/// Case-insensitive match against display name or any place type
fn matches_keyword(place: &Value, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    let name = place["displayName"]["text"].as_str().unwrap_or("").to_lowercase();
    let types = place["types"]
        .as_array()
        .map(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .unwrap_or_default();

    name.contains(&keyword) || types.contains(&keyword)
}

fn reduce_place(place: &Value) -> Value {
    json!({
        "name": place["displayName"]["text"],
        "address": place["formattedAddress"],
        "location": {
            "lat": place["location"]["latitude"],
            "lng": place["location"]["longitude"]
        },
        "rating": place["rating"],
        "types": place["types"].as_array().cloned().unwrap_or_default(),
        "place_id": place["id"]
    })
}
