//! Burst-collapsing delayed execution
//!
//! A [`Debouncer`] owns at most one pending call. Scheduling a new call
//! cancels the previous one, so only the last call within a quiet window
//! actually runs. Used for search-as-you-type: one request per pause in
//! typing instead of one per keystroke.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Pending(Mutex<Option<JoinHandle<()>>>);

impl Pending {
    fn replace(&self, handle: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match handle {
            Some(h) => slot.replace(h),
            None => slot.take(),
        }
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        if let Some(handle) = self.replace(None) {
            handle.abort();
        }
    }
}

/// Collapses bursts of calls into one delayed call
///
/// Clones share the same pending slot, so any clone can cancel or supersede
/// the scheduled call. The pending call is aborted when the last clone is
/// dropped; a call already past its delay and running is not interrupted
/// mid-await by `schedule`, it is simply no longer the pending one.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use listsync::debounce::Debouncer;
///
/// # async fn demo() {
/// let debouncer = Debouncer::new();
/// debouncer.schedule(Duration::from_millis(300), || async {
///     // fires only if nothing else is scheduled within 300ms
/// });
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    pending: Arc<Pending>,
}

impl Debouncer {
    /// Create a debouncer with no pending call
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending call, then schedule `action` to run after `delay`
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending.replace(None) {
            previous.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        });
        if let Some(raced) = self.pending.replace(Some(handle)) {
            // Another clone scheduled between our take and store; the newest
            // scheduled call wins.
            raced.abort();
        }
    }

    /// Cancel the pending call without scheduling a new one
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.replace(None) {
            handle.abort();
        }
    }
}
