//! Error types for gmaps-mcp
//!
//! Centralized error handling using thiserror. Layer-specific errors
//! (`MapsError`, `ToolError`) live next to the code that raises them and
//! convert into `GmapsError` at the crate edge.

use thiserror::Error;

use crate::maps::MapsError;

/// All error types that can surface outside the tool layer
#[derive(Debug, Error)]
pub enum GmapsError {
    /// Configuration missing or invalid
    #[error("Config error: {0}")]
    Config(String),

    /// External Maps API failure
    #[error("Maps error: {0}")]
    Maps(#[from] MapsError),

    /// GPS trace analysis could not complete
    #[error("Trace analysis failed: {0}")]
    Trace(String),

    /// Transport/protocol failure on the stdio server
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML config parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for gmaps-mcp operations
pub type Result<T> = std::result::Result<T, GmapsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = GmapsError::Config("Google Maps API key is required".to_string());
        assert_eq!(err.to_string(), "Config error: Google Maps API key is required");
    }

    #[test]
    fn test_trace_error() {
        let err = GmapsError::Trace("Failed to snap GPS points to roads".to_string());
        assert_eq!(err.to_string(), "Trace analysis failed: Failed to snap GPS points to roads");
    }

    #[test]
    fn test_maps_error_conversion() {
        let maps_err = MapsError::api("REQUEST_DENIED", None);
        let err: GmapsError = maps_err.into();
        assert!(matches!(err, GmapsError::Maps(_)));
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GmapsError = io_err.into();
        assert!(matches!(err, GmapsError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: GmapsError = json_err.into();
        assert!(matches!(err, GmapsError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(GmapsError::Config("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
