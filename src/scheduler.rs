//! One-shot delayed tasks with explicit cancellation.

use crate::error::{Error, Result};
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a task scheduled with [`schedule_once`].
///
/// Dropping the handle does not cancel the task.
pub struct ScanHandle<T> {
    token: CancellationToken,
    join: JoinHandle<Option<T>>,
}

impl<T> ScanHandle<T> {
    /// Prevents the task from running if its delay has not elapsed yet.
    /// Has no effect once the task has started.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the task. `None` if it was cancelled before it ran or panicked.
    pub async fn join(self) -> Option<T> {
        self.join.await.ok().flatten()
    }
}

/// Runs `task` on the current tokio runtime once `delay` has elapsed, unless `token` is
/// cancelled first.
///
/// Pass a child of the host's shutdown token to have the task skipped when the host stops
/// during the delay.
///
/// # Errors
///
/// Returns [`Error::Scheduling`] when called outside a tokio runtime.
pub fn schedule_once<F, Fut, T>(
    delay: Duration,
    token: CancellationToken,
    task: F,
) -> Result<ScanHandle<T>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let runtime = Handle::try_current().map_err(|e| Error::Scheduling(e.to_string()))?;
    let guard = token.clone();
    let join = runtime.spawn(async move {
        tokio::select! {
            biased;
            _ = guard.cancelled() => {
                debug!("Scheduled scan cancelled before it ran");
                None
            }
            _ = tokio::time::sleep(delay) => Some(task().await),
        }
    });

    Ok(ScanHandle { token, join })
}
