//! Human-readable compliance report output

use colored::*;
use gmaps_mcp::scoring::{Severity, Violation};
use gmaps_mcp::trace::ComplianceReport;

/// Violations listed before the report collapses the rest into a count
const SHOWN_VIOLATIONS: usize = 5;

pub fn render(report: &ComplianceReport) -> String {
    let mut out = Vec::new();

    out.push(format!("{} {}", "Vehicle:".bold(), report.vehicle_id));
    out.push(format!("{} {}", "Analyzed:".bold(), report.timestamp.to_rfc3339()));
    out.push(format!(
        "{} {} of {} points",
        "Snapped:".bold(),
        report.snapped_points,
        report.trace_length
    ));
    out.push(format!("{} {}", "Compliance score:".bold(), score_label(report.compliance_score)));
    out.push(format!("{} {}", "Violations:".bold(), report.violations.len()));

    for violation in report.violations.iter().take(SHOWN_VIOLATIONS) {
        out.push(format!("  {}", violation_line(violation)));
    }
    if report.violations.len() > SHOWN_VIOLATIONS {
        out.push(format!("  ... and {} more", report.violations.len() - SHOWN_VIOLATIONS));
    }

    if !report.recommendations.is_empty() {
        out.push(format!("{}", "Recommendations:".bold()));
        for recommendation in &report.recommendations {
            out.push(format!("  - {}", recommendation));
        }
    }

    out.join("\n")
}

fn score_label(score: f64) -> ColoredString {
    let label = format!("{:.1}/100", score);
    if score >= 90.0 {
        label.green()
    } else if score >= 70.0 {
        label.yellow()
    } else {
        label.red()
    }
}

fn violation_line(violation: &Violation) -> String {
    let severity = match violation.severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".red(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".normal(),
    };
    let location = violation
        .location
        .as_ref()
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown location".to_string());

    format!(
        "[{}] {:.0} km/h in a {:.0} km/h zone (+{:.1}%) at {}",
        severity, violation.vehicle_speed, violation.speed_limit, violation.overage_percent, location
    )
}
