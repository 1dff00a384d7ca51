use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::debug;

use crate::models::jobs::JobFilter;
use crate::store::JobChange;

/// Tells a subscription when to re-read and re-deliver the job list.
pub trait Trigger: Send + 'static {
    /// Resolves on the next firing; `false` once the source is gone for good.
    fn fired(&mut self) -> BoxFuture<'_, bool>;
}

/// Fires on a fixed period. Used by mock stores, which have no change stream
/// of their own.
pub struct PollTrigger {
    interval: Interval,
}

impl PollTrigger {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        // The first delivery happens before the first wait, so skip the immediate tick.
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Trigger for PollTrigger {
    fn fired(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.interval.tick().await;
            true
        })
    }
}

/// Fires whenever the store reports a change relevant to `filter`.
pub struct PushTrigger {
    changes: broadcast::Receiver<JobChange>,
    filter: JobFilter,
}

impl PushTrigger {
    pub fn new(changes: broadcast::Receiver<JobChange>, filter: JobFilter) -> Self {
        Self { changes, filter }
    }

    /// Swallows changes that queued up meanwhile; one re-read covers them all.
    fn drain(&mut self) {
        while self.changes.try_recv().is_ok() {}
    }
}

impl Trigger for PushTrigger {
    fn fired(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            loop {
                match self.changes.recv().await {
                    Ok(change) if self.filter.matches(&change.brand_id) => {
                        self.drain();
                        return true;
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Push subscriber lagged, re-reading");
                        self.drain();
                        return true;
                    }
                    Err(broadcast::error::RecvError::Closed) => return false,
                }
            }
        })
    }
}

/// A trigger fired by hand through its [`ManualNotifier`].
pub struct ManualTrigger {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct ManualNotifier {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualNotifier {
    pub fn notify(&self) {
        let _ = self.tx.send(());
    }
}

/// Creates a connected notifier/trigger pair. Dropping every notifier closes
/// the trigger.
pub fn manual() -> (ManualNotifier, ManualTrigger) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualNotifier { tx }, ManualTrigger { rx })
}

impl Trigger for ManualTrigger {
    fn fired(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move { self.rx.recv().await.is_some() })
    }
}
