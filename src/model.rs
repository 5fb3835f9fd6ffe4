//! Normalized Maps payloads
//!
//! Typed views over the raw JSON returned by the Maps APIs. Unknown fields
//! are ignored and missing fields fall back to defaults, so partial payloads
//! still decode.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::maps::MapsError;

/// A WGS84 coordinate.
///
/// Accepts both `{lat, lng}` (web services) and `{latitude, longitude}`
/// (Roads/Places) on input; always serializes as `{lat, lng}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse a `"lat,lng"` string
    pub fn parse(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self::new(lat, lng))
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A `{text, value}` pair as used for distances and durations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: u64,
}

/// One step of a route leg
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub html_instructions: String,
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub start_location: Option<LatLng>,
    #[serde(default)]
    pub travel_mode: Option<String>,
}

/// One leg of a route
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub duration_in_traffic: Option<TextValue>,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    #[serde(default)]
    pub start_location: Option<LatLng>,
    #[serde(default)]
    pub end_location: Option<LatLng>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

impl RouteLeg {
    /// Duration under traffic, falling back to the free-flow duration
    pub fn traffic_duration(&self) -> &TextValue {
        self.duration_in_traffic.as_ref().unwrap_or(&self.duration)
    }
}

/// An encoded overview polyline
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Polyline {
    #[serde(default)]
    pub points: String,
}

/// One route returned by the Directions API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub overview_polyline: Option<Polyline>,
}

impl Route {
    pub fn first_leg(&self) -> Option<&RouteLeg> {
        self.legs.first()
    }

    /// Summary text, with a placeholder when Google returned none
    pub fn summary_or_default(&self) -> &str {
        if self.summary.is_empty() { "Route" } else { &self.summary }
    }
}

/// One GPS sample from a vehicle trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lng: f64,
    /// Speed in km/h, when the tracker reported one
    #[serde(default)]
    pub speed: Option<f64>,
}

impl GpsPoint {
    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A GPS point aligned to the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnappedPoint {
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default, alias = "originalIndex")]
    pub original_index: Option<usize>,
    #[serde(default, alias = "placeId")]
    pub place_id: String,
}

/// Posted speed limit for a road segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimit {
    #[serde(default, alias = "placeId")]
    pub place_id: String,
    #[serde(default, alias = "speedLimit")]
    pub speed_limit: Option<f64>,
    #[serde(default)]
    pub units: String,
}

/// One elevation sample
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElevationSample {
    pub elevation: f64,
    #[serde(default)]
    pub location: Option<LatLng>,
}

/// Decode a list of raw payloads into typed values
pub fn decode_all<T>(values: Vec<Value>) -> Result<Vec<T>, MapsError>
where
    T: for<'de> Deserialize<'de>,
{
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(|e| MapsError::Decode(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latlng_parse() {
        assert_eq!(LatLng::parse("37.422,-122.084"), Some(LatLng::new(37.422, -122.084)));
        assert_eq!(LatLng::parse(" 40.7 , -74.0 "), Some(LatLng::new(40.7, -74.0)));
        assert_eq!(LatLng::parse("not a place"), None);
        assert_eq!(LatLng::parse("91,0"), None);
        assert_eq!(LatLng::parse("0,181"), None);
        assert_eq!(LatLng::parse("1.0"), None);
    }

    #[test]
    fn test_latlng_display() {
        assert_eq!(LatLng::new(37.422, -122.084).to_string(), "37.422,-122.084");
    }

    #[test]
    fn test_latlng_accepts_long_names() {
        let loc: LatLng = serde_json::from_value(json!({"latitude": 1.5, "longitude": 2.5})).unwrap();
        assert_eq!(loc, LatLng::new(1.5, 2.5));
        assert_eq!(serde_json::to_value(loc).unwrap(), json!({"lat": 1.5, "lng": 2.5}));
    }

    #[test]
    fn test_route_decodes_partial_leg() {
        let route: Route = serde_json::from_value(json!({
            "legs": [{
                "duration": {"value": 1000, "text": "17 mins"},
                "duration_in_traffic": {"value": 1500, "text": "25 mins"}
            }]
        }))
        .unwrap();

        let leg = route.first_leg().unwrap();
        assert_eq!(leg.duration.value, 1000);
        assert_eq!(leg.traffic_duration().value, 1500);
        assert_eq!(leg.distance, TextValue::default());
        assert_eq!(route.summary_or_default(), "Route");
    }

    #[test]
    fn test_traffic_duration_falls_back() {
        let leg = RouteLeg {
            duration: TextValue {
                text: "10 mins".to_string(),
                value: 600,
            },
            ..Default::default()
        };
        assert_eq!(leg.traffic_duration().value, 600);
    }

    #[test]
    fn test_snapped_point_from_roads_payload() {
        let point: SnappedPoint = serde_json::from_value(json!({
            "location": {"latitude": 37.42, "longitude": -122.08},
            "originalIndex": 0,
            "placeId": "ChIJ1"
        }))
        .unwrap();
        assert_eq!(point.place_id, "ChIJ1");
        assert_eq!(point.original_index, Some(0));
        assert_eq!(point.location, Some(LatLng::new(37.42, -122.08)));
    }

    #[test]
    fn test_speed_limit_missing_fields() {
        let limit: SpeedLimit = serde_json::from_value(json!({"speedLimit": 50})).unwrap();
        assert_eq!(limit.speed_limit, Some(50.0));
        assert!(limit.place_id.is_empty());
    }

    #[test]
    fn test_gps_point_speed_optional() {
        let point: GpsPoint = serde_json::from_value(json!({"lat": 1.0, "lng": 2.0})).unwrap();
        assert_eq!(point.speed, None);
        assert_eq!(point.location(), LatLng::new(1.0, 2.0));
    }

    #[test]
    fn test_decode_all_reports_bad_payload() {
        let result = decode_all::<ElevationSample>(vec![json!({"elevation": 10.0}), json!({"nope": 1})]);
        assert!(matches!(result, Err(MapsError::Decode(_))));
    }
}
