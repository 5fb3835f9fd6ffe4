//! get_speed_limits tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::required_string_list;
use super::{Tool, ToolContext, ToolError};
use crate::maps::Endpoint;
use crate::model::{SpeedLimit, decode_all};

/// Roads API limit for one speed-limit request
pub const MAX_PLACE_IDS: usize = 100;

pub struct GetSpeedLimitsTool;

#[async_trait]
impl Tool for GetSpeedLimitsTool {
    fn name(&self) -> &'static str {
        "get_speed_limits"
    }

    fn description(&self) -> &'static str {
        "Get speed limit data for road segments. Requires place IDs from snap_to_roads. Critical for fleet safety and compliance monitoring."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "place_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Place IDs from snap_to_roads results",
                    "minItems": 1,
                    "maxItems": MAX_PLACE_IDS
                }
            },
            "required": ["place_ids"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let place_ids = required_string_list(input, "place_ids", 1, MAX_PLACE_IDS)?;

        log::info!("getting_speed_limits num_places={}", place_ids.len());

        let raw = ctx
            .call(Endpoint::SpeedLimits, move |api| api.speed_limits(&place_ids))
            .await?;
        let limits: Vec<SpeedLimit> = decode_all(raw)?;

        log::info!("speed_limits_retrieved count={}", limits.len());
        Ok(json!({"speed_limits": limits, "count": limits.len()}))
    }
}
