//! Maps API client layer
//!
//! This module provides:
//! - The `MapsApi` trait: one synchronous method per Google Maps Platform endpoint
//! - Request types for each endpoint
//! - `MapsError`, which separates transport failures from API-level failures
//! - `GoogleMapsClient`, the HTTP implementation
//! - `MockMapsApi`, a scripted in-memory implementation for tests

mod error;
pub mod google;
mod mock;

pub use error::MapsError;
pub use google::{Endpoints, GoogleMapsClient};
pub use mock::{MockCall, MockMapsApi};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::model::LatLng;

/// The external Maps API endpoints this crate talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Directions,
    DistanceMatrix,
    Geocode,
    ReverseGeocode,
    SnapToRoads,
    SpeedLimits,
    Elevation,
    SearchNearby,
    PlaceDetails,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directions => "directions",
            Self::DistanceMatrix => "distance_matrix",
            Self::Geocode => "geocode",
            Self::ReverseGeocode => "reverse_geocode",
            Self::SnapToRoads => "snap_to_roads",
            Self::SpeedLimits => "speed_limits",
            Self::Elevation => "elevation",
            Self::SearchNearby => "search_nearby",
            Self::PlaceDetails => "place_details",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous Maps Platform client.
///
/// Every method performs exactly one blocking HTTP round trip and returns the
/// raw payload (the `routes`/`results`/`snappedPoints`/... part of the body).
/// Callers run these through `Invoker`, which moves them onto the blocking
/// worker pool and applies the retry policy.
pub trait MapsApi: Send + Sync {
    /// Directions: returns the `routes` array (empty on ZERO_RESULTS)
    fn directions(&self, request: &DirectionsRequest) -> Result<Vec<Value>, MapsError>;

    /// Distance matrix: returns the whole body (`rows`, `origin_addresses`, ...)
    fn distance_matrix(&self, request: &DistanceMatrixRequest) -> Result<Value, MapsError>;

    /// Forward geocoding: returns the `results` array
    fn geocode(&self, request: &GeocodeRequest) -> Result<Vec<Value>, MapsError>;

    /// Reverse geocoding: returns the `results` array
    fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Vec<Value>, MapsError>;

    /// Roads API snap: returns the `snappedPoints` array
    fn snap_to_roads(&self, path: &[LatLng], interpolate: bool) -> Result<Vec<Value>, MapsError>;

    /// Roads API speed limits: returns the `speedLimits` array
    fn speed_limits(&self, place_ids: &[String]) -> Result<Vec<Value>, MapsError>;

    /// Elevation samples along an encoded polyline: returns the `results` array
    fn elevation_along_path(&self, encoded_polyline: &str, samples: u32) -> Result<Vec<Value>, MapsError>;

    /// Places (v1) nearby search: returns the `places` array
    fn search_nearby(&self, request: &NearbySearchRequest) -> Result<Vec<Value>, MapsError>;

    /// Places (v1) place details: returns the place object
    fn place_details(&self, request: &PlaceDetailsRequest) -> Result<Value, MapsError>;
}

/// Parameters for a directions lookup
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub departure_time: Option<DateTime<FixedOffset>>,
    pub alternatives: bool,
    pub avoid: Vec<String>,
    pub traffic_model: Option<String>,
}

impl DirectionsRequest {
    /// Driving directions with no alternatives, avoidances or traffic model
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            mode: "driving".to_string(),
            departure_time: None,
            alternatives: false,
            avoid: Vec::new(),
            traffic_model: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_departure_time(mut self, departure_time: DateTime<FixedOffset>) -> Self {
        self.departure_time = Some(departure_time);
        self
    }

    pub fn with_traffic_model(mut self, traffic_model: impl Into<String>) -> Self {
        self.traffic_model = Some(traffic_model.into());
        self
    }
}

/// Parameters for a distance matrix lookup
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrixRequest {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub mode: String,
    pub avoid: Vec<String>,
    pub units: String,
}

/// Parameters for forward geocoding
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub address: String,
    /// Component filters, e.g. `country -> US`
    pub components: BTreeMap<String, String>,
    pub region: Option<String>,
}

/// Parameters for reverse geocoding
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseGeocodeRequest {
    pub location: LatLng,
    pub result_types: Vec<String>,
}

/// Parameters for a Places nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub location: LatLng,
    pub radius_meters: f64,
    pub included_types: Vec<String>,
    pub max_result_count: u32,
}

/// Parameters for a Places details lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetailsRequest {
    pub place_id: String,
    /// Comma-separated Places field mask, e.g. `displayName,websiteUri`
    pub field_mask: String,
}
