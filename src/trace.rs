//! GPS trace compliance analysis
//!
//! Snaps a recorded trace to the road network, looks up the posted limit for
//! each distinct road segment once, and scores the driver against it.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{GmapsError, Result};
use crate::model::{GpsPoint, SnappedPoint, SpeedLimit};
use crate::scoring::{Violation, compliance_score, recommendations};
use crate::tools::{GetSpeedLimitsTool, MIN_PATH_POINTS, SnapToRoadsTool, Tool, ToolContext, ToolResponse};

/// Place ids per speed-limit request
const SPEED_LIMIT_BATCH: usize = 100;

/// Fleet safety report for one vehicle trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub vehicle_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub trace_length: usize,
    pub snapped_points: usize,
    pub violations: Vec<Violation>,
    pub compliance_score: f64,
    pub recommendations: Vec<String>,
}

pub struct TraceAnalyzer {
    ctx: ToolContext,
    snap: SnapToRoadsTool,
    speed_limits: GetSpeedLimitsTool,
}

impl TraceAnalyzer {
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            ctx,
            snap: SnapToRoadsTool,
            speed_limits: GetSpeedLimitsTool,
        }
    }

    /// Analyze one trace. Speeds and limits are compared in the same unit.
    pub async fn analyze(
        &self,
        trace: &[GpsPoint],
        vehicle_id: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<ComplianceReport> {
        log::info!("analyzing_trace vehicle_id={} points={}", vehicle_id, trace.len());

        // Snapping needs a path of at least two points
        if trace.len() < MIN_PATH_POINTS {
            return Ok(build_report(vehicle_id, timestamp, trace, 0, Vec::new()));
        }

        let snapped = self.snap_trace(trace).await?;
        log::info!("trace_snapped vehicle_id={} snapped={}", vehicle_id, snapped.len());

        let place_ids = unique_place_ids(&snapped);
        let limits = self.lookup_limits(&place_ids).await?;
        log::info!("trace_limits_retrieved vehicle_id={} segments={}", vehicle_id, limits.len());

        let violations = detect_violations(trace, &snapped, &limits);
        let report = build_report(vehicle_id, timestamp, trace, snapped.len(), violations);

        log::info!(
            "trace_analyzed vehicle_id={} violations={} score={}",
            vehicle_id,
            report.violations.len(),
            report.compliance_score
        );
        Ok(report)
    }

    async fn snap_trace(&self, trace: &[GpsPoint]) -> Result<Vec<SnappedPoint>> {
        let path: Vec<Value> = trace.iter().map(|p| json!({"lat": p.lat, "lng": p.lng})).collect();
        let response = self
            .snap
            .execute(json!({"path": path, "interpolate": true}), &self.ctx)
            .await;

        let data = envelope_data(response, "Failed to snap GPS points to roads")?;
        decode_field(data, "snapped_points", "Failed to snap GPS points to roads")
    }

    async fn lookup_limits(&self, place_ids: &[String]) -> Result<HashMap<String, f64>> {
        let mut limits = HashMap::new();

        for batch in place_ids.chunks(SPEED_LIMIT_BATCH) {
            let response = self
                .speed_limits
                .execute(json!({"place_ids": batch}), &self.ctx)
                .await;

            let data = envelope_data(response, "Failed to retrieve speed limits")?;
            let batch_limits: Vec<SpeedLimit> = decode_field(data, "speed_limits", "Failed to retrieve speed limits")?;
            for limit in batch_limits {
                if let Some(kmh) = limit.speed_limit {
                    limits.insert(limit.place_id, kmh);
                }
            }
        }

        Ok(limits)
    }
}

/// Read a JSON array of `{lat, lng, speed?}` points
pub fn load_trace(path: &Path) -> Result<Vec<GpsPoint>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Distinct segment ids, first-seen order
pub fn unique_place_ids(snapped: &[SnappedPoint]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    snapped
        .iter()
        .filter(|p| !p.place_id.is_empty())
        .filter(|p| seen.insert(p.place_id.as_str()))
        .map(|p| p.place_id.clone())
        .collect()
}

/// Pair snapped points with recorded speeds by position.
///
/// Points past the end of the trace, and segments with no known limit, are
/// skipped. A point without a recorded speed counts as stationary.
pub fn detect_violations(trace: &[GpsPoint], snapped: &[SnappedPoint], limits: &HashMap<String, f64>) -> Vec<Violation> {
    snapped
        .iter()
        .zip(trace)
        .filter_map(|(point, recorded)| {
            let limit = *limits.get(&point.place_id)?;
            Violation::detect(point.location, limit, recorded.speed.unwrap_or(0.0))
        })
        .collect()
}

fn build_report(
    vehicle_id: &str,
    timestamp: DateTime<FixedOffset>,
    trace: &[GpsPoint],
    snapped_points: usize,
    violations: Vec<Violation>,
) -> ComplianceReport {
    ComplianceReport {
        vehicle_id: vehicle_id.to_string(),
        timestamp,
        trace_length: trace.len(),
        snapped_points,
        compliance_score: compliance_score(trace.len(), &violations),
        recommendations: recommendations(&violations),
        violations,
    }
}

fn envelope_data(response: ToolResponse, step: &str) -> Result<Value> {
    match response {
        ToolResponse::Success { data, .. } => Ok(data),
        ToolResponse::Error { error, .. } => Err(GmapsError::Trace(format!("{}: {}", step, error))),
    }
}

fn decode_field<T>(mut data: Value, field: &str, step: &str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let value = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| GmapsError::Trace(format!("{}: {}", step, e)))
}
