//! GPS speed-compliance scoring

use serde::{Deserialize, Serialize};

use crate::model::LatLng;

/// How far over the limit a violation was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// CRITICAL above 50%, HIGH above 25%, MEDIUM above 10% (all exclusive)
    pub fn from_overage_percent(percent: f64) -> Self {
        if percent > 50.0 {
            Severity::Critical
        } else if percent > 25.0 {
            Severity::High
        } else if percent > 10.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Points deducted from the compliance score per violation
    pub fn penalty(&self) -> f64 {
        match self {
            Severity::Critical => 5.0,
            Severity::High => 3.0,
            Severity::Medium => 1.0,
            Severity::Low => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub location: Option<LatLng>,
    pub speed_limit: f64,
    pub vehicle_speed: f64,
    pub overage: f64,
    pub overage_percent: f64,
    pub severity: Severity,
}

impl Violation {
    /// A violation iff `vehicle_speed > speed_limit`; a non-positive limit never yields one
    pub fn detect(location: Option<LatLng>, speed_limit: f64, vehicle_speed: f64) -> Option<Self> {
        if speed_limit <= 0.0 || vehicle_speed <= speed_limit {
            return None;
        }

        let overage = vehicle_speed - speed_limit;
        let overage_percent = overage / speed_limit * 100.0;
        Some(Self {
            location,
            speed_limit,
            vehicle_speed,
            overage,
            overage_percent,
            severity: Severity::from_overage_percent(overage_percent),
        })
    }
}

/// Violation histogram by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut counts = Self::default();
        for v in violations {
            match v.severity {
                Severity::Low => counts.low += 1,
                Severity::Medium => counts.medium += 1,
                Severity::High => counts.high += 1,
                Severity::Critical => counts.critical += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

/// `100 * (1 - violations/points)` less severity penalties, clamped to [0, 100].
///
/// An empty trace is fully compliant.
pub fn compliance_score(total_points: usize, violations: &[Violation]) -> f64 {
    if total_points == 0 {
        return 100.0;
    }

    let violation_rate = violations.len() as f64 / total_points as f64;
    let penalties: f64 = violations.iter().map(|v| v.severity.penalty()).sum();
    let score = (1.0 - violation_rate) * 100.0 - penalties;

    score.clamp(0.0, 100.0)
}

/// Advice derived from the violation histogram.
///
/// No violations yields only the positive message. Otherwise the CRITICAL,
/// training and limiter messages are added when their thresholds hit, and the
/// total-count summary always comes last.
pub fn recommendations(violations: &[Violation]) -> Vec<String> {
    if violations.is_empty() {
        return vec!["Excellent driving! No violations detected.".to_string()];
    }

    let counts = SeverityCounts::from_violations(violations);
    let mut recommendations = Vec::new();

    if counts.critical > 0 {
        recommendations.push("CRITICAL: Excessive speeding detected. Immediate driver counseling required.".to_string());
    }
    if counts.high > 2 {
        recommendations.push("Multiple high-severity violations. Schedule driver safety training.".to_string());
    }
    if counts.total() > 5 {
        recommendations.push("Consider installing in-vehicle speed limiters or warning systems.".to_string());
    }
    recommendations.push(format!(
        "Total violations: {}. Review route and driver behavior.",
        counts.total()
    ));

    recommendations
}
