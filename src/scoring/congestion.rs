//! Traffic congestion classification

use std::fmt;

use serde::Serialize;

use super::{round1, traffic_ratio};

/// Congestion bucket for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CongestionLevel {
    Low,
    Moderate,
    Heavy,
}

impl CongestionLevel {
    /// Heavy above 1.3, Moderate above 1.1, Low otherwise (both bounds exclusive)
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.3 {
            CongestionLevel::Heavy
        } else if ratio > 1.1 {
            CongestionLevel::Moderate
        } else {
            CongestionLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::Heavy => "Heavy",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CongestionAnalysis {
    pub level: CongestionLevel,
    pub ratio: f64,
    /// Extra time spent in traffic; 0 when traffic is faster than free-flow
    pub delay_secs: u64,
    /// `delay_secs / 60` rounded to one decimal
    pub delay_minutes: f64,
}

pub fn classify_congestion(normal_secs: u64, traffic_secs: u64) -> CongestionAnalysis {
    let ratio = traffic_ratio(normal_secs, traffic_secs);
    let delay_secs = traffic_secs.saturating_sub(normal_secs);

    CongestionAnalysis {
        level: CongestionLevel::from_ratio(ratio),
        ratio,
        delay_secs,
        delay_minutes: round1(delay_secs as f64 / 60.0),
    }
}
