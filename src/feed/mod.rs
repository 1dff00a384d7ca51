//! Job-list subscriptions.
//!
//! Every subscription looks the same to its listener: the full, filtered,
//! newest-first job list, once right away and again each time its trigger
//! fires. Remote stores fire on change events, mock stores on a poll tick.

pub mod redis;
pub mod triggers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

use crate::models::jobs::{Job, JobFilter};
use crate::store::{DataStore, StoreMode};
use triggers::{PollTrigger, PushTrigger, Trigger};

/// Handle to a running subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: Uuid,
    handle: AbortHandle,
    active: AtomicBool,
}

impl Subscription {
    fn new(id: Uuid, handle: AbortHandle) -> Self {
        Self {
            id,
            handle,
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stops deliveries. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.handle.abort();
            debug!(subscription = %self.id, "Job subscription cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl DataStore {
    /// Subscribes `listener` to the job list, using push delivery in remote
    /// mode and polling in mock mode.
    pub fn subscribe_jobs<F>(self: &Arc<Self>, filter: JobFilter, listener: F) -> Subscription
    where
        F: FnMut(Vec<Job>) + Send + 'static,
    {
        let trigger: Box<dyn Trigger> = match self.mode() {
            StoreMode::Remote => Box::new(PushTrigger::new(self.changes(), filter.clone())),
            StoreMode::Mock => Box::new(PollTrigger::new(self.poll_interval())),
        };
        self.subscribe_jobs_with(filter, trigger, listener)
    }

    /// Like [`DataStore::subscribe_jobs`] with an explicit trigger.
    pub fn subscribe_jobs_with<F>(
        self: &Arc<Self>,
        filter: JobFilter,
        mut trigger: Box<dyn Trigger>,
        mut listener: F,
    ) -> Subscription
    where
        F: FnMut(Vec<Job>) + Send + 'static,
    {
        let store = Arc::clone(self);
        let id = Uuid::new_v4();
        debug!(subscription = %id, brand_id = ?filter.brand_id, "Job subscription started");

        let task = tokio::spawn(async move {
            loop {
                let jobs = store.list_jobs(&filter).await;
                listener(jobs);
                if !trigger.fired().await {
                    break;
                }
            }
            debug!(subscription = %id, "Job subscription source closed");
        });

        Subscription::new(id, task.abort_handle())
    }
}
