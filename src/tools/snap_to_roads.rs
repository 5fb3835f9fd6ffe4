//! snap_to_roads tool

use async_trait::async_trait;
use serde_json::{Value, json};

use super::args::{optional_bool, required_points};
use super::{Tool, ToolContext, ToolError};
use crate::maps::Endpoint;
use crate::model::{SnappedPoint, decode_all};

/// Roads API limits for one snap request
pub const MIN_PATH_POINTS: usize = 2;
pub const MAX_PATH_POINTS: usize = 100;

pub struct SnapToRoadsTool;

#[async_trait]
impl Tool for SnapToRoadsTool {
    fn name(&self) -> &'static str {
        "snap_to_roads"
    }

    fn description(&self) -> &'static str {
        "Snap GPS coordinates to the nearest road. Useful for cleaning noisy GPS data from vehicle tracking systems."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "lat": {"type": "number"},
                            "lng": {"type": "number"}
                        },
                        "required": ["lat", "lng"]
                    },
                    "description": "Array of GPS coordinates to snap to roads",
                    "minItems": MIN_PATH_POINTS,
                    "maxItems": MAX_PATH_POINTS
                },
                "interpolate": {
                    "type": "boolean",
                    "default": true,
                    "description": "Fill gaps between GPS points"
                }
            },
            "required": ["path"]
        })
    }

    async fn run(&self, input: &Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let path = required_points(input, "path", MIN_PATH_POINTS, MAX_PATH_POINTS)?;
        let interpolate = optional_bool(input, "interpolate", true)?;

        log::info!("snapping_to_roads num_points={} interpolate={}", path.len(), interpolate);

        let raw = ctx
            .call(Endpoint::SnapToRoads, move |api| api.snap_to_roads(&path, interpolate))
            .await?;
        let snapped: Vec<SnappedPoint> = decode_all(raw)?;

        log::info!("roads_snapped snapped_points={}", snapped.len());
        Ok(json!({"snapped_points": snapped, "count": snapped.len()}))
    }
}
