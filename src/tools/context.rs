//! Tool execution context shared by every invocation

use crate::invoker::{CancellationToken, Invoker};
use crate::maps::{Endpoint, MapsApi, MapsError};

/// Result-size and search-radius limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_results: u32,
    pub default_radius_meters: u32,
    pub max_radius_meters: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_results: 20,
            default_radius_meters: 5000,
            max_radius_meters: 50000,
        }
    }
}

/// Execution context for tools.
///
/// Cheap to clone. Each invocation can carry its own cancellation token via
/// `with_cancel`; everything else is shared read-only.
#[derive(Clone, Debug)]
pub struct ToolContext {
    invoker: Invoker,
    limits: Limits,
    cancel: CancellationToken,
}

impl ToolContext {
    pub fn new(invoker: Invoker, limits: Limits) -> Self {
        Self {
            invoker,
            limits,
            cancel: CancellationToken::new(),
        }
    }

    /// Same context bound to a different cancellation token
    pub fn with_cancel(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one Maps call through the invoker under this context's token
    pub async fn call<T, F>(&self, endpoint: Endpoint, f: F) -> Result<T, MapsError>
    where
        T: Send + 'static,
        F: Fn(&dyn MapsApi) -> Result<T, MapsError> + Send + Sync + 'static,
    {
        self.invoker.call(endpoint, &self.cancel, f).await
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Missing or malformed argument, detected before any external call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The API answered but had nothing usable
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Maps(#[from] MapsError),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::NotFound(message.into())
    }
}
