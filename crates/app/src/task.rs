//! Cancellable background tasks with a bounded shutdown grace.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A spawned loop that stops cooperatively when its token is cancelled.
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Spawn `body` on the tokio runtime, handing it the token it must watch.
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let handle = tokio::spawn(body(token.clone()));
        tracing::debug!(task = name, "background task started");
        Self {
            name,
            token,
            handle,
        }
    }

    /// Whether the task has already returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait up to `grace` for it to return, then abort.
    pub async fn stop(self, grace: Duration) {
        self.token.cancel();
        let abort = self.handle.abort_handle();
        match tokio::time::timeout(grace, self.handle).await {
            Ok(Ok(())) => tracing::debug!(task = self.name, "background task stopped"),
            Ok(Err(err)) => tracing::warn!(task = self.name, %err, "background task panicked"),
            Err(_) => {
                abort.abort();
                tracing::warn!(task = self.name, "background task ignored cancellation, aborted");
            }
        }
    }
}
