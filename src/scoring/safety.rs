//! Route safety scoring
//!
//! Three sub-factors are scored independently and combined with fixed
//! weights: traffic x4, road speed x4, time of day x2. The weighted sum is
//! kept literal (range 48..=120) and only the reported value is clamped.

use serde::Serialize;

use super::{round1, traffic_ratio};

/// Weights applied to the traffic, road and time sub-scores
const TRAFFIC_WEIGHT: f64 = 4.0;
const ROAD_WEIGHT: f64 = 4.0;
const TIME_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrafficRisk {
    Low,
    Moderate,
    High,
}

impl TrafficRisk {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.4 {
            TrafficRisk::High
        } else if ratio > 1.1 {
            TrafficRisk::Moderate
        } else {
            TrafficRisk::Low
        }
    }

    pub fn sub_score(&self) -> f64 {
        match self {
            TrafficRisk::Low => 10.0,
            TrafficRisk::Moderate => 7.0,
            TrafficRisk::High => 4.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficRisk::Low => "Low",
            TrafficRisk::Moderate => "Moderate",
            TrafficRisk::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoadRisk {
    #[serde(rename = "Low Speed")]
    LowSpeed,
    #[serde(rename = "Moderate Speed")]
    ModerateSpeed,
    #[serde(rename = "High Speed")]
    HighSpeed,
    Unknown,
}

impl RoadRisk {
    /// Classify by the highest posted limit in km/h
    pub fn from_max_limit(max_kmh: f64) -> Self {
        if max_kmh > 100.0 {
            RoadRisk::HighSpeed
        } else if max_kmh > 60.0 {
            RoadRisk::ModerateSpeed
        } else {
            RoadRisk::LowSpeed
        }
    }

    pub fn sub_score(&self) -> f64 {
        match self {
            RoadRisk::LowSpeed => 9.0,
            RoadRisk::ModerateSpeed => 8.0,
            RoadRisk::HighSpeed => 6.0,
            RoadRisk::Unknown => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadRisk::LowSpeed => "Low Speed",
            RoadRisk::ModerateSpeed => "Moderate Speed",
            RoadRisk::HighSpeed => "High Speed",
            RoadRisk::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeRisk {
    Day,
    Night,
}

impl TimeRisk {
    /// Night is before 06:00 or from 21:00
    pub fn from_hour(hour: u32) -> Self {
        if hour < 6 || hour > 20 { TimeRisk::Night } else { TimeRisk::Day }
    }

    pub fn sub_score(&self) -> f64 {
        match self {
            TimeRisk::Day => 10.0,
            TimeRisk::Night => 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 60.0 {
            RiskLevel::High
        } else if score < 80.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Everything the scorer needs, already extracted from Maps payloads
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyInputs {
    pub duration_secs: u64,
    pub duration_in_traffic_secs: u64,
    /// Posted limits (km/h) along the route; `None` when the lookup failed
    pub speed_limits: Option<Vec<f64>>,
    pub departure_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDetails {
    pub traffic_risk: TrafficRisk,
    pub road_risk: RoadRisk,
    pub time_risk: TimeRisk,
    pub max_speed_limit_kmh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyAssessment {
    /// Weighted score clamped to [0, 100] and rounded to one decimal
    pub safety_score: f64,
    pub risk_level: RiskLevel,
    pub details: RiskDetails,
    pub risk_factors: Vec<String>,
}

/// Score one route
pub fn assess_route(inputs: &SafetyInputs) -> SafetyAssessment {
    let traffic_risk = TrafficRisk::from_ratio(traffic_ratio(inputs.duration_secs, inputs.duration_in_traffic_secs));

    let observed_max = inputs
        .speed_limits
        .as_deref()
        .and_then(|limits| limits.iter().copied().filter(|l| l.is_finite()).reduce(f64::max));
    let road_risk = observed_max.map(RoadRisk::from_max_limit).unwrap_or(RoadRisk::Unknown);
    // A posted limit of 0 still counts as a sample but is not reported
    let max_speed_limit = observed_max.filter(|max| *max > 0.0);

    let time_risk = TimeRisk::from_hour(inputs.departure_hour);

    let raw_score = traffic_risk.sub_score() * TRAFFIC_WEIGHT
        + road_risk.sub_score() * ROAD_WEIGHT
        + time_risk.sub_score() * TIME_WEIGHT;

    let mut risk_factors = Vec::new();
    if traffic_risk != TrafficRisk::Low {
        risk_factors.push(format!("Traffic: {} congestion", traffic_risk.as_str()));
    }
    if let (RoadRisk::HighSpeed, Some(max)) = (road_risk, max_speed_limit) {
        risk_factors.push(format!("Road: High speed limit ({} km/h)", max));
    }
    if time_risk == TimeRisk::Night {
        risk_factors.push("Conditions: Night driving".to_string());
    }

    SafetyAssessment {
        safety_score: round1(raw_score.clamp(0.0, 100.0)),
        risk_level: RiskLevel::from_score(raw_score),
        details: RiskDetails {
            traffic_risk,
            road_risk,
            time_risk,
            max_speed_limit_kmh: max_speed_limit,
        },
        risk_factors,
    }
}
