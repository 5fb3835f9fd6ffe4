//! Google Maps Platform HTTP client
//!
//! Implements `MapsApi` on top of a blocking reqwest client. Three API
//! families are covered:
//! - Legacy web services (`/maps/api/<service>/json`) which report failures
//!   through a `status` field in the body
//! - Roads API (`roads.googleapis.com/v1`)
//! - Places API v1 (`places.googleapis.com/v1`), which takes a field mask header
//!
//! The latter two report failures through HTTP status plus an `error` object.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};

use super::{
    DirectionsRequest, DistanceMatrixRequest, GeocodeRequest, MapsApi, MapsError, NearbySearchRequest,
    PlaceDetailsRequest, ReverseGeocodeRequest,
};
use crate::model::LatLng;

/// Default base URL for legacy web services
const WEB_SERVICES_URL: &str = "https://maps.googleapis.com";

/// Default base URL for the Roads API
const ROADS_URL: &str = "https://roads.googleapis.com";

/// Default base URL for the Places API (v1)
const PLACES_URL: &str = "https://places.googleapis.com";

/// Field mask used for nearby search
const NEARBY_FIELD_MASK: &str =
    "places.id,places.displayName,places.formattedAddress,places.location,places.rating,places.types";

/// Base URLs for each API family
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub web_services: String,
    pub roads: String,
    pub places: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            web_services: WEB_SERVICES_URL.to_string(),
            roads: ROADS_URL.to_string(),
            places: PLACES_URL.to_string(),
        }
    }
}

/// Google Maps Platform client
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    endpoints: Endpoints,
}

impl GoogleMapsClient {
    /// Create a client for the public Google endpoints
    ///
    /// Must be called outside of an async context: the blocking client owns
    /// its own runtime.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, MapsError> {
        Self::with_endpoints(api_key, timeout, Endpoints::default())
    }

    /// Create a client pointed at custom base URLs
    pub fn with_endpoints(
        api_key: impl Into<String>,
        timeout: Duration,
        endpoints: Endpoints,
    ) -> Result<Self, MapsError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MapsError::Internal("Google Maps API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapsError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoints,
        })
    }

    /// Call a legacy web service and return the checked body
    fn web_service(&self, service: &str, params: &[(&str, String)]) -> Result<Value, MapsError> {
        let url = format!("{}/maps/api/{}/json", self.endpoints.web_services, service);
        log::debug!("GET {} ({} params)", url, params.len());

        let request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())]);
        let (status, body) = send(request)?;
        check_web_service_body(status, body)
    }

    /// Call the Roads API and return the checked body
    fn roads(&self, path: &str, params: &[(&str, String)]) -> Result<Value, MapsError> {
        let url = format!("{}/v1/{}", self.endpoints.roads, path);
        log::debug!("GET {} ({} params)", url, params.len());

        let request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())]);
        let (status, body) = send(request)?;
        check_platform_body(status, body)
    }

    /// Attach Places authentication and field mask headers
    fn places_request(&self, request: RequestBuilder, field_mask: &str) -> RequestBuilder {
        request
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", field_mask)
    }
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl MapsApi for GoogleMapsClient {
    fn directions(&self, request: &DirectionsRequest) -> Result<Vec<Value>, MapsError> {
        let mut params = vec![
            ("origin", request.origin.clone()),
            ("destination", request.destination.clone()),
            ("mode", request.mode.clone()),
        ];
        if request.alternatives {
            params.push(("alternatives", "true".to_string()));
        }
        if !request.avoid.is_empty() {
            params.push(("avoid", request.avoid.join("|")));
        }
        if let Some(departure) = request.departure_time {
            params.push(("departure_time", departure.timestamp().to_string()));
        }
        if let Some(model) = &request.traffic_model {
            params.push(("traffic_model", model.clone()));
        }

        let body = self.web_service("directions", &params)?;
        Ok(array_field(&body, "routes"))
    }

    fn distance_matrix(&self, request: &DistanceMatrixRequest) -> Result<Value, MapsError> {
        let mut params = vec![
            ("origins", request.origins.join("|")),
            ("destinations", request.destinations.join("|")),
            ("mode", request.mode.clone()),
            ("units", request.units.clone()),
        ];
        if !request.avoid.is_empty() {
            params.push(("avoid", request.avoid.join("|")));
        }

        self.web_service("distancematrix", &params)
    }

    fn geocode(&self, request: &GeocodeRequest) -> Result<Vec<Value>, MapsError> {
        let mut params = vec![("address", request.address.clone())];
        if !request.components.is_empty() {
            let components: Vec<String> = request
                .components
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect();
            params.push(("components", components.join("|")));
        }
        if let Some(region) = &request.region {
            params.push(("region", region.clone()));
        }

        let body = self.web_service("geocode", &params)?;
        Ok(array_field(&body, "results"))
    }

    fn reverse_geocode(&self, request: &ReverseGeocodeRequest) -> Result<Vec<Value>, MapsError> {
        let mut params = vec![("latlng", request.location.to_string())];
        if !request.result_types.is_empty() {
            params.push(("result_type", request.result_types.join("|")));
        }

        let body = self.web_service("geocode", &params)?;
        Ok(array_field(&body, "results"))
    }

    fn snap_to_roads(&self, path: &[LatLng], interpolate: bool) -> Result<Vec<Value>, MapsError> {
        let params = vec![("path", encode_path(path)), ("interpolate", interpolate.to_string())];

        let body = self.roads("snapToRoads", &params)?;
        Ok(array_field(&body, "snappedPoints"))
    }

    fn speed_limits(&self, place_ids: &[String]) -> Result<Vec<Value>, MapsError> {
        let params: Vec<(&str, String)> = place_ids.iter().map(|id| ("placeId", id.clone())).collect();

        let body = self.roads("speedLimits", &params)?;
        Ok(array_field(&body, "speedLimits"))
    }

    fn elevation_along_path(&self, encoded_polyline: &str, samples: u32) -> Result<Vec<Value>, MapsError> {
        let params = vec![
            ("path", format!("enc:{}", encoded_polyline)),
            ("samples", samples.to_string()),
        ];

        let body = self.web_service("elevation", &params)?;
        Ok(array_field(&body, "results"))
    }

    fn search_nearby(&self, request: &NearbySearchRequest) -> Result<Vec<Value>, MapsError> {
        let url = format!("{}/v1/places:searchNearby", self.endpoints.places);
        let mut payload = json!({
            "maxResultCount": request.max_result_count,
            "rankPreference": "DISTANCE",
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": request.location.lat,
                        "longitude": request.location.lng
                    },
                    "radius": request.radius_meters
                }
            }
        });
        if !request.included_types.is_empty() {
            payload["includedTypes"] = json!(request.included_types);
        }
        log::debug!("POST {}", url);

        let builder = self.places_request(self.client.post(&url), NEARBY_FIELD_MASK).json(&payload);
        let (status, body) = send(builder)?;
        let body = check_platform_body(status, body)?;
        Ok(array_field(&body, "places"))
    }

    fn place_details(&self, request: &PlaceDetailsRequest) -> Result<Value, MapsError> {
        let url = place_details_url(&self.endpoints.places, &request.place_id)?;
        log::debug!("GET {}", url);

        let builder = self.places_request(self.client.get(url), &request.field_mask);
        let (status, body) = send(builder)?;
        check_platform_body(status, body)
    }
}

/// Send a request and parse whatever JSON body came back
fn send(request: RequestBuilder) -> Result<(u16, Value), MapsError> {
    let response = request.send()?;
    let status = response.status().as_u16();
    let text = response.text()?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if (200..300).contains(&status) => {
                return Err(MapsError::Decode(format!("Failed to parse response: {}", e)));
            }
            Err(_) => Value::Null,
        }
    };

    Ok((status, body))
}

/// Classify a legacy web-service response.
///
/// `OK` and `ZERO_RESULTS` both succeed; every other status string becomes
/// `MapsError::Api`. Upstream 5xx responses are transport failures.
pub fn check_web_service_body(http_status: u16, body: Value) -> Result<Value, MapsError> {
    if http_status >= 500 {
        return Err(MapsError::Transport(format!("HTTP {}", http_status)));
    }

    match body["status"].as_str() {
        Some("OK") | Some("ZERO_RESULTS") => Ok(body),
        Some(status) => Err(MapsError::api(
            status,
            body["error_message"].as_str().map(String::from),
        )),
        None if (200..300).contains(&http_status) => {
            Err(MapsError::Decode("Response is missing a status field".to_string()))
        }
        None => Err(MapsError::api(format!("HTTP_{}", http_status), None)),
    }
}

/// Classify a Roads/Places response, which signal failure through HTTP status
pub fn check_platform_body(http_status: u16, body: Value) -> Result<Value, MapsError> {
    if http_status >= 500 {
        return Err(MapsError::Transport(format!("HTTP {}", http_status)));
    }
    if (200..300).contains(&http_status) {
        return Ok(body);
    }

    let error = &body["error"];
    let status = error["status"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP_{}", http_status));
    Err(MapsError::api(status, error["message"].as_str().map(String::from)))
}

/// Place Details resource URL. The id is percent-encoded as a single path
/// segment so it cannot reach another resource or add a query.
pub fn place_details_url(base: &str, place_id: &str) -> Result<Url, MapsError> {
    let mut url = Url::parse(base).map_err(|e| MapsError::Internal(format!("Invalid Places endpoint: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| MapsError::Internal(format!("Invalid Places endpoint: {}", base)))?
        .pop_if_empty()
        .extend(["v1", "places", place_id]);
    Ok(url)
}

/// Roads API path parameter: `lat,lng|lat,lng|...`
pub fn encode_path(points: &[LatLng]) -> String {
    points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

fn array_field(body: &Value, key: &str) -> Vec<Value> {
    body[key].as_array().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_default() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.web_services, "https://maps.googleapis.com");
        assert_eq!(endpoints.roads, "https://roads.googleapis.com");
        assert_eq!(endpoints.places, "https://places.googleapis.com");
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let result = GoogleMapsClient::new("  ", Duration::from_secs(5));
        assert!(matches!(result, Err(MapsError::Internal(_))));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GoogleMapsClient::new("secret-key", Duration::from_secs(5)).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("GoogleMapsClient"));
    }

    #[test]
    fn test_web_service_ok() {
        let body = json!({"status": "OK", "routes": [{"summary": "I-280"}]});
        let checked = check_web_service_body(200, body).unwrap();
        assert_eq!(array_field(&checked, "routes").len(), 1);
    }

    #[test]
    fn test_web_service_zero_results_is_empty_success() {
        let body = json!({"status": "ZERO_RESULTS", "routes": []});
        let checked = check_web_service_body(200, body).unwrap();
        assert!(array_field(&checked, "routes").is_empty());
    }

    #[test]
    fn test_web_service_error_status() {
        let body = json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        });
        let err = check_web_service_body(200, body).unwrap_err();
        assert_eq!(err.api_status(), Some("REQUEST_DENIED"));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("The provided API key is invalid."));
    }

    #[test]
    fn test_web_service_over_query_limit_not_retryable() {
        let body = json!({"status": "OVER_QUERY_LIMIT"});
        let err = check_web_service_body(200, body).unwrap_err();
        assert_eq!(err.api_status(), Some("OVER_QUERY_LIMIT"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_web_service_5xx_is_transport() {
        let err = check_web_service_body(503, Value::Null).unwrap_err();
        assert!(matches!(err, MapsError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_web_service_missing_status() {
        let err = check_web_service_body(200, json!({"routes": []})).unwrap_err();
        assert!(matches!(err, MapsError::Decode(_)));

        let err = check_web_service_body(403, Value::Null).unwrap_err();
        assert_eq!(err.api_status(), Some("HTTP_403"));
    }

    #[test]
    fn test_platform_success() {
        let body = json!({"snappedPoints": [{"placeId": "p1"}]});
        let checked = check_platform_body(200, body).unwrap();
        assert_eq!(array_field(&checked, "snappedPoints").len(), 1);
    }

    #[test]
    fn test_platform_error_object() {
        let body = json!({
            "error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}
        });
        let err = check_platform_body(403, body).unwrap_err();
        assert_eq!(err.api_status(), Some("PERMISSION_DENIED"));
        assert_eq!(err.to_string(), "PERMISSION_DENIED (API key not valid.)");
    }

    #[test]
    fn test_platform_error_without_body() {
        let err = check_platform_body(404, Value::Null).unwrap_err();
        assert_eq!(err.api_status(), Some("HTTP_404"));
    }

    #[test]
    fn test_platform_5xx_is_transport() {
        let err = check_platform_body(500, Value::Null).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_encode_path() {
        let path = vec![LatLng::new(37.422, -122.084), LatLng::new(37.4225, -122.0845)];
        assert_eq!(encode_path(&path), "37.422,-122.084|37.4225,-122.0845");
        assert_eq!(encode_path(&[]), "");
    }

    #[test]
    fn test_place_details_url() {
        let url = place_details_url("https://places.googleapis.com", "ChIJN1t_tDeuEmsRUsoyG83frY4").unwrap();
        assert_eq!(url.as_str(), "https://places.googleapis.com/v1/places/ChIJN1t_tDeuEmsRUsoyG83frY4");

        let url = place_details_url("http://127.0.0.1:8080/", "abc").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/places/abc");
    }

    #[test]
    fn test_place_details_url_encodes_id() {
        let url = place_details_url("https://places.googleapis.com", "abc/../x?y#z").unwrap();
        assert_eq!(url.as_str(), "https://places.googleapis.com/v1/places/abc%2F..%2Fx%3Fy%23z");
        assert_eq!(url.path_segments().map(|s| s.count()), Some(3));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_place_details_url_rejects_bad_base() {
        assert!(matches!(place_details_url("not a url", "abc"), Err(MapsError::Internal(_))));
        assert!(matches!(place_details_url("mailto:maps@example.com", "abc"), Err(MapsError::Internal(_))));
    }

    #[test]
    fn test_array_field_missing() {
        assert!(array_field(&json!({"status": "OK"}), "results").is_empty());
        assert!(array_field(&Value::Null, "results").is_empty());
    }
}
