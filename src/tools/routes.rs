//! Shared directions lookup for the route-based tools

use super::{ToolContext, ToolError};
use crate::maps::{DirectionsRequest, Endpoint};
use crate::model::{Route, RouteLeg, decode_all};

pub const TRAFFIC_MODELS: &[&str] = &["best_guess", "optimistic", "pessimistic"];

/// Fetch and decode every route for a request
pub async fn fetch_routes(ctx: &ToolContext, request: DirectionsRequest) -> Result<Vec<Route>, ToolError> {
    let raw = ctx.call(Endpoint::Directions, move |api| api.directions(&request)).await?;
    Ok(decode_all(raw)?)
}

/// First route and its first leg, or "No route found"
pub async fn first_route(ctx: &ToolContext, request: DirectionsRequest) -> Result<(Route, RouteLeg), ToolError> {
    let route = fetch_routes(ctx, request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ToolError::not_found("No route found"))?;
    let leg = route
        .first_leg()
        .cloned()
        .ok_or_else(|| ToolError::not_found("No route found"))?;
    Ok((route, leg))
}
