//! Pure scoring functions
//!
//! Nothing in here performs I/O. The tools gather Maps data and hand plain
//! numbers to these functions, which makes every threshold unit-testable.

pub mod compliance;
pub mod congestion;
pub mod safety;

pub use compliance::{Severity, SeverityCounts, Violation, compliance_score, recommendations};
pub use congestion::{CongestionAnalysis, CongestionLevel, classify_congestion};
pub use safety::{RiskLevel, RoadRisk, SafetyAssessment, SafetyInputs, TimeRisk, TrafficRisk, assess_route};

/// Round to one decimal place, halves away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Ratio of in-traffic to free-flow duration; 1.0 when free-flow is unknown
pub fn traffic_ratio(normal_secs: u64, traffic_secs: u64) -> f64 {
    if normal_secs == 0 {
        1.0
    } else {
        traffic_secs as f64 / normal_secs as f64
    }
}
