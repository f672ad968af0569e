use crate::backend::{ApiResult, BackendApi};
use crate::domain::suggestion::Suggestion;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// A value re-fetched on a fixed period by a background task. The first
/// fetch runs immediately. Failed fetches are logged and keep the previous
/// value. Stopping or dropping the handle cancels the task. A zero period is
/// raised to one second.
pub struct PeriodicRefresh<T> {
    handle: JoinHandle<()>,
    rx: watch::Receiver<Option<T>>,
}

impl<T> PeriodicRefresh<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let period = if period.is_zero() {
            tracing::warn!(refresh = name, "zero refresh period, using {MIN_PERIOD:?}");
            MIN_PERIOD
        } else {
            period
        };
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match fetch().await {
                    Ok(value) => {
                        tracing::debug!(refresh = name, "periodic refresh succeeded");
                        if tx.send(Some(value)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(refresh = name, error = %err, "periodic refresh failed");
                    }
                }
            }
        });
        Self { handle, rx }
    }

    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next successful fetch. `None` once the task has ended.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {}
}

impl<T> Drop for PeriodicRefresh<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Smart suggestions feed, refreshed every `period`.
pub fn suggestions_feed(
    backend: Arc<dyn BackendApi>,
    period: Duration,
) -> PeriodicRefresh<Vec<Suggestion>> {
    PeriodicRefresh::spawn("smart_suggestions", period, move || {
        let backend = Arc::clone(&backend);
        async move { backend.smart_suggestions().await }
    })
}
