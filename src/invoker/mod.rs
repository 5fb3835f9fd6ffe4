//! Blocking-call invoker
//!
//! Maps API calls are synchronous. `Invoker` runs each attempt on tokio's
//! blocking pool, bounds how many run at once, and wraps the whole thing in
//! the retry policy so tool handlers stay plain `async` code.

mod cancel;
mod retry;

pub use cancel::CancellationToken;
pub use retry::{RetryPolicy, retry};

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::maps::{Endpoint, MapsApi, MapsError};

/// Runs synchronous Maps calls off the async executor
#[derive(Clone)]
pub struct Invoker {
    api: Arc<dyn MapsApi>,
    policy: RetryPolicy,
    workers: Arc<Semaphore>,
}

impl Invoker {
    pub fn new(api: Arc<dyn MapsApi>, policy: RetryPolicy, max_concurrent_calls: usize) -> Self {
        Self {
            api,
            policy,
            workers: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call one endpoint through the worker pool with retries.
    ///
    /// A worker permit is held for the duration of each blocking attempt,
    /// not across backoff sleeps. A panic inside `f` surfaces as
    /// `MapsError::Internal` and is not retried.
    pub async fn call<T, F>(&self, endpoint: Endpoint, cancel: &CancellationToken, f: F) -> Result<T, MapsError>
    where
        T: Send + 'static,
        F: Fn(&dyn MapsApi) -> Result<T, MapsError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);

        retry(&self.policy, cancel, endpoint.as_str(), |attempt| {
            let api = Arc::clone(&self.api);
            let f = Arc::clone(&f);
            let workers = Arc::clone(&self.workers);

            async move {
                let permit = workers
                    .acquire_owned()
                    .await
                    .map_err(|_| MapsError::Internal("worker pool closed".to_string()))?;
                log::debug!("{}: attempt {}", endpoint, attempt);

                tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    f(api.as_ref())
                })
                .await
                .map_err(|e| MapsError::Internal(format!("{} worker failed: {}", endpoint, e)))?
            }
        })
        .await
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("policy", &self.policy)
            .field("available_workers", &self.workers.available_permits())
            .finish()
    }
}
