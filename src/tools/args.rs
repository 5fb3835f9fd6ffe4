//! Argument extraction helpers
//!
//! Tools receive raw JSON. These helpers pull typed values out and turn any
//! missing or malformed field into `ToolError::InvalidArgument`.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use serde_json::Value;

use super::ToolError;
use crate::model::LatLng;

pub fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Err(ToolError::invalid(format!("Missing required argument: {}", key))),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ToolError::invalid(format!("Argument '{}' must not be empty", key)))
        }
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::invalid(format!("Argument '{}' must be a string", key))),
    }
}

pub fn optional_str<'a>(input: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ToolError::invalid(format!("Argument '{}' must be a string", key))),
    }
}

/// Optional string restricted to a fixed set of values
pub fn optional_choice<'a>(
    input: &'a Value,
    key: &str,
    allowed: &[&str],
    default: &'a str,
) -> Result<&'a str, ToolError> {
    let value = optional_str(input, key)?.unwrap_or(default);
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(ToolError::invalid(format!(
            "Argument '{}' must be one of: {}",
            key,
            allowed.join(", ")
        )))
    }
}

pub fn optional_bool(input: &Value, key: &str, default: bool) -> Result<bool, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ToolError::invalid(format!("Argument '{}' must be a boolean", key))),
    }
}

pub fn optional_u64(input: &Value, key: &str) -> Result<Option<u64>, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| ToolError::invalid(format!("Argument '{}' must be a non-negative integer", key))),
    }
}

pub fn optional_f64(input: &Value, key: &str) -> Result<Option<f64>, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid(format!("Argument '{}' must be a number", key))),
    }
}

/// Required number within an inclusive range
pub fn required_f64_in(input: &Value, key: &str, min: f64, max: f64) -> Result<f64, ToolError> {
    let value = optional_f64(input, key)?.ok_or_else(|| ToolError::invalid(format!("Missing required argument: {}", key)))?;
    if !(min..=max).contains(&value) {
        return Err(ToolError::invalid(format!(
            "Argument '{}' must be between {} and {}",
            key, min, max
        )));
    }
    Ok(value)
}

/// Optional list of strings (empty when absent)
pub fn string_list(input: &Value, key: &str) -> Result<Vec<String>, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| ToolError::invalid(format!("Argument '{}' must be a list of strings", key)))
            })
            .collect(),
        Some(_) => Err(ToolError::invalid(format!("Argument '{}' must be a list of strings", key))),
    }
}

/// Required list of strings with a length bound
pub fn required_string_list(input: &Value, key: &str, min: usize, max: usize) -> Result<Vec<String>, ToolError> {
    if input.get(key).is_none_or(Value::is_null) {
        return Err(ToolError::invalid(format!("Missing required argument: {}", key)));
    }
    let items = string_list(input, key)?;
    check_len(key, items.len(), min, max)?;
    Ok(items)
}

/// Required list of `{lat, lng}` objects with a length bound
pub fn required_points(input: &Value, key: &str, min: usize, max: usize) -> Result<Vec<LatLng>, ToolError> {
    let items = match input.get(key) {
        None | Some(Value::Null) => return Err(ToolError::invalid(format!("Missing required argument: {}", key))),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ToolError::invalid(format!("Argument '{}' must be a list of points", key))),
    };
    check_len(key, items.len(), min, max)?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let lat = item["lat"].as_f64();
            let lng = item["lng"].as_f64();
            match (lat, lng) {
                (Some(lat), Some(lng)) => Ok(LatLng::new(lat, lng)),
                _ => Err(ToolError::invalid(format!("{}[{}] must have numeric lat and lng", key, i))),
            }
        })
        .collect()
}

/// Optional object of string values, e.g. geocoding component filters
pub fn string_map(input: &Value, key: &str) -> Result<std::collections::BTreeMap<String, String>, ToolError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(Default::default()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                _ => Err(ToolError::invalid(format!("Argument '{}.{}' must be a string", key, k))),
            })
            .collect(),
        Some(_) => Err(ToolError::invalid(format!("Argument '{}' must be an object", key))),
    }
}

/// `departure_time` argument, defaulting to now in the local zone
pub fn departure_time(input: &Value) -> Result<DateTime<FixedOffset>, ToolError> {
    match optional_str(input, "departure_time")? {
        Some(text) => parse_departure_time(text),
        None => Ok(Local::now().fixed_offset()),
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (offset or trailing `Z`) and naive date-times, which are
/// taken as local time.
pub fn parse_departure_time(text: &str) -> Result<DateTime<FixedOffset>, ToolError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| ToolError::invalid(format!("Invalid departure_time '{}': expected ISO-8601", text)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| ToolError::invalid(format!("departure_time '{}' does not exist in the local time zone", text)))
}

fn check_len(key: &str, len: usize, min: usize, max: usize) -> Result<(), ToolError> {
    if len < min || len > max {
        return Err(ToolError::invalid(format!(
            "Argument '{}' must contain between {} and {} items (got {})",
            key, min, max, len
        )));
    }
    Ok(())
}
