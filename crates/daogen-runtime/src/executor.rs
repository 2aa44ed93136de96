//! Dispatch of blocking relational calls off the caller's task.
//!
//! Every call is submitted explicitly to tokio's blocking pool and its
//! outcome travels back over a `oneshot` channel. The sender is consumed
//! by the single `send`, so a caller observes exactly one outcome.

use crate::metrics::DaoMetrics;
use daogen_core::{DaogenError, DaogenResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};
use tracing::{trace, warn};

/// Blocking executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of blocking calls in flight at once.
    pub max_in_flight: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_in_flight: 64 }
    }
}

/// Runs blocking mapping-layer calls on tokio's blocking pool.
///
/// Cheap to clone; clones share the same in-flight limit. Once a call has
/// been handed to a worker it runs to completion even if the caller stops
/// waiting, there is no mid-flight cancellation.
#[derive(Debug, Clone)]
pub struct BlockingExecutor {
    permits: Arc<Semaphore>,
    config: ExecutorConfig,
}

impl BlockingExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        let limit = config.max_in_flight.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            config: ExecutorConfig { max_in_flight: limit },
        }
    }

    /// Returns the executor configuration.
    #[must_use]
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Returns how many more calls could be dispatched right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Executes `call` on a blocking worker and awaits its single outcome.
    ///
    /// A panic inside `call` is reported as a [`DaogenError::Dispatch`]
    /// failure rather than unwinding into the caller.
    pub async fn execute<T, F>(&self, operation: &'static str, table: &str, call: F) -> DaogenResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> DaogenResult<T> + Send + 'static,
    {
        let started = Instant::now();
        let outcome = self.dispatch(operation, call).await;
        DaoMetrics::operation_completed(table, operation, started.elapsed(), outcome.is_ok());
        if let Err(e) = &outcome {
            trace!(table, operation, error = %e, "DAO operation failed");
        }
        outcome
    }

    async fn dispatch<T, F>(&self, operation: &'static str, call: F) -> DaogenResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> DaogenResult<T> + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|e| DaogenError::dispatch(operation, e.to_string()))?;

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| DaogenError::dispatch(operation, e.to_string()))?;

        let (completion, outcome) = oneshot::channel::<DaogenResult<T>>();

        handle.spawn_blocking(move || {
            let _permit = permit;
            let result = panic::catch_unwind(AssertUnwindSafe(call))
                .unwrap_or_else(|payload| Err(DaogenError::dispatch(operation, panic_message(payload.as_ref()))));
            if completion.send(result).is_err() {
                warn!(operation, "Caller stopped waiting; outcome discarded");
            }
        });

        outcome
            .await
            .unwrap_or_else(|_| Err(DaogenError::dispatch(operation, "worker dropped the completion")))
    }
}

impl Default for BlockingExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("blocking call panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("blocking call panicked: {message}")
    } else {
        "blocking call panicked".to_string()
    }
}
