//! Debounced task scheduling on the tokio runtime.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A restartable delayed task.
///
/// Each [`schedule`](Debounce::schedule) aborts the previously pending
/// firing, so at most one firing is outstanding per `Debounce` and it is
/// timed from the most recent call. Last write wins; nothing is queued.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arms the timer with `task`, cancelling any firing still pending.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prior) = pending.take() {
            prior.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Drops the pending firing, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prior) = pending.take() {
            prior.abort();
        }
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
