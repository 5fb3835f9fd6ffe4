//! Scripted in-memory `MapsApi` for tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde_json::Value;

use super::{
    DirectionsRequest, DistanceMatrixRequest, Endpoint, GeocodeRequest, MapsApi, MapsError, NearbySearchRequest,
    PlaceDetailsRequest, ReverseGeocodeRequest,
};
use crate::model::LatLng;

/// A call recorded by `MockMapsApi`
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Directions(DirectionsRequest),
    DistanceMatrix(DistanceMatrixRequest),
    Geocode(GeocodeRequest),
    ReverseGeocode(ReverseGeocodeRequest),
    SnapToRoads { path: Vec<LatLng>, interpolate: bool },
    SpeedLimits(Vec<String>),
    Elevation { encoded_polyline: String, samples: u32 },
    SearchNearby(NearbySearchRequest),
    PlaceDetails(PlaceDetailsRequest),
}

impl MockCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            MockCall::Directions(_) => Endpoint::Directions,
            MockCall::DistanceMatrix(_) => Endpoint::DistanceMatrix,
            MockCall::Geocode(_) => Endpoint::Geocode,
            MockCall::ReverseGeocode(_) => Endpoint::ReverseGeocode,
            MockCall::SnapToRoads { .. } => Endpoint::SnapToRoads,
            MockCall::SpeedLimits(_) => Endpoint::SpeedLimits,
            MockCall::Elevation { .. } => Endpoint::Elevation,
            MockCall::SearchNearby(_) => Endpoint::SearchNearby,
            MockCall::PlaceDetails(_) => Endpoint::PlaceDetails,
        }
    }
}

/// Mock Maps client with per-endpoint response queues.
///
/// Responses are consumed in order; the last one for an endpoint is sticky,
/// so a single configured response answers every call. Array endpoints expect
/// a JSON array payload.
#[derive(Default)]
pub struct MockMapsApi {
    responses: Mutex<HashMap<Endpoint, VecDeque<Result<Value, MapsError>>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockMapsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful payload for an endpoint
    pub fn with_response(self, endpoint: Endpoint, payload: Value) -> Self {
        self.push(endpoint, Ok(payload));
        self
    }

    /// Queue a failure for an endpoint
    pub fn with_error(self, endpoint: Endpoint, error: MapsError) -> Self {
        self.push(endpoint, Err(error));
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls made to one endpoint
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|c| c.endpoint() == endpoint).count()
    }

    fn push(&self, endpoint: Endpoint, response: Result<Value, MapsError>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(endpoint)
            .or_default()
            .push_back(response);
    }

    fn record(&self, call: MockCall) -> Result<Value, MapsError> {
        let endpoint = call.endpoint();
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        let queue = responses
            .get_mut(&endpoint)
            .ok_or_else(|| MapsError::Internal(format!("No mock response configured for {}", endpoint)))?;

        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(MapsError::Internal("empty mock queue".to_string())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(MapsError::Internal("empty mock queue".to_string())))
        }
    }

    fn record_array(&self, call: MockCall) -> Result<Vec<Value>, MapsError> {
        let payload = self.record(call)?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }
}

impl MapsApi for MockMapsApi {
    fn directions(&self, request: &DirectionsRequest) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::Directions(request.clone()))
    }

    fn distance_matrix(&self, request: &DistanceMatrixRequest) -> Result<Value, MapsError> {
        self.record(MockCall::DistanceMatrix(request.clone()))
    }

    fn geocode(&self, request: &GeocodeRequest) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::Geocode(request.clone()))
    }

    fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::ReverseGeocode(request.clone()))
    }

    fn snap_to_roads(&self, path: &[LatLng], interpolate: bool) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::SnapToRoads {
            path: path.to_vec(),
            interpolate,
        })
    }

    fn speed_limits(&self, place_ids: &[String]) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::SpeedLimits(place_ids.to_vec()))
    }

    fn elevation_along_path(&self, encoded_polyline: &str, samples: u32) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::Elevation {
            encoded_polyline: encoded_polyline.to_string(),
            samples,
        })
    }

    fn search_nearby(&self, request: &NearbySearchRequest) -> Result<Vec<Value>, MapsError> {
        self.record_array(MockCall::SearchNearby(request.clone()))
    }

    fn place_details(&self, request: &PlaceDetailsRequest) -> Result<Value, MapsError> {
        self.record(MockCall::PlaceDetails(request.clone()))
    }
}
