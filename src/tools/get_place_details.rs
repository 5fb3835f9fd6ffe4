//! get_place_details tool - Places details with a caller-selected field set

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{required_str, string_list};
use super::{Tool, ToolContext, ToolError};
use crate::maps::{Endpoint, PlaceDetailsRequest};

/// Caller-facing field names and their Places API field mask entries
const FIELD_MASK: &[(&str, &str)] = &[
    ("name", "displayName"),
    ("address", "formattedAddress"),
    ("location", "location"),
    ("phone", "nationalPhoneNumber"),
    ("website", "websiteUri"),
    ("rating", "rating"),
    ("opening_hours", "regularOpeningHours"),
    ("types", "types"),
];

pub struct GetPlaceDetailsTool;

#[async_trait]
impl Tool for GetPlaceDetailsTool {
    fn name(&self) -> &'static str {
        "get_place_details"
    }

    fn description(&self) -> &'static str {
        "Get detailed information about a specific place using its place ID. Returns contact details, website, rating, opening hours, and more."
    }

    fn input_schema(&self) -> Value {
        let names: Vec<&str> = FIELD_MASK.iter().map(|(name, _)| *name).collect();
        json!({
            "type": "object",
            "properties": {
                "place_id": {
                    "type": "string",
                    "description": "Google Place ID (e.g., from search_places)"
                },
                "fields": {
                    "type": "array",
                    "items": {"type": "string", "enum": names},
                    "description": "Fields to return (default: all)"
                }
            },
            "required": ["place_id"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let place_id = required_str(input, "place_id")?.to_string();
        let fields = string_list(input, "fields")?;
        let field_mask = build_field_mask(&fields)?;

        log::info!("getting_place_details place_id={} field_mask={}", place_id, field_mask);

        let request = PlaceDetailsRequest {
            place_id: place_id.clone(),
            field_mask,
        };
        let place = ctx.call(Endpoint::PlaceDetails, move |api| api.place_details(&request)).await?;

        Ok(json!({
            "place_id": place["id"].as_str().unwrap_or(&place_id),
            "name": place["displayName"]["text"],
            "address": place["formattedAddress"],
            "location": location(&place),
            "phone_number": place["nationalPhoneNumber"],
            "website": place["websiteUri"],
            "rating": place["rating"],
            "opening_hours": place["regularOpeningHours"]["weekdayDescriptions"],
            "types": place["types"].as_array().cloned().unwrap_or_default()
        }))
    }
}

/// Comma-separated mask for the requested fields (all when empty); `id` is always included
fn build_field_mask(fields: &[String]) -> Result<String, ToolError> {
    let mut mask = vec!["id"];
    if fields.is_empty() {
        mask.extend(FIELD_MASK.iter().map(|(_, api)| *api));
    } else {
        for field in fields {
            let api = FIELD_MASK
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, api)| *api)
                .ok_or_else(|| ToolError::invalid(format!("Unknown place field: {}", field)))?;
            if !mask.contains(&api) {
                mask.push(api);
            }
        }
    }
    Ok(mask.join(","))
}

fn location(place: &Value) -> Value {
    match (place["location"]["latitude"].as_f64(), place["location"]["longitude"].as_f64()) {
        (Some(lat), Some(lng)) => json!({"lat": lat, "lng": lng}),
        _ => Value::Null,
    }
}
