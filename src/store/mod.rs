//! The data store adapter: the one owner of job and profile records.
//!
//! A store starts either in remote mode (talking to a [`RemoteBackend`]) or in
//! mock mode (in-memory). The first failing remote call flips it to mock mode
//! for the rest of its life; callers never see that failure, they just get the
//! mock answer instead.

pub mod backend;
pub mod mock;
pub mod sql;

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{MarketError, MarketResult, StoreError};
use crate::feed::redis::RedisChangeFeed;
use crate::models::jobs::{Job, JobFilter, JobGuard, JobPatch, NewJob, UpdateOutcome, sort_newest_first};
use crate::models::profiles::{ProfilePatch, UserProfile, merge_or_create};

pub use backend::RemoteBackend;
use mock::MockStore;
use sql::SqlBackend;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    Remote,
    Mock,
}

/// Emitted after every job write, whichever mode served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobChange {
    pub job_id: String,
    pub brand_id: String,
    /// Store instance that made the write.
    pub origin: Uuid,
}

pub struct DataStore {
    app_id: String,
    instance_id: Uuid,
    backend: Option<Arc<dyn RemoteBackend>>,
    degraded: AtomicBool,
    mode_tx: watch::Sender<StoreMode>,
    changes: broadcast::Sender<JobChange>,
    change_feed: OnceLock<Arc<RedisChangeFeed>>,
    mock: MockStore,
    poll_interval: Duration,
}

impl DataStore {
    fn assemble(app_id: &str, backend: Option<Arc<dyn RemoteBackend>>) -> Self {
        let mode = if backend.is_some() {
            StoreMode::Remote
        } else {
            StoreMode::Mock
        };
        let (mode_tx, _) = watch::channel(mode);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            app_id: app_id.to_string(),
            instance_id: Uuid::new_v4(),
            degraded: AtomicBool::new(backend.is_none()),
            backend,
            mode_tx,
            changes,
            change_feed: OnceLock::new(),
            mock: MockStore::seeded(),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// A store that never leaves mock mode.
    pub fn mock(app_id: &str) -> Self {
        Self::assemble(app_id, None)
    }

    /// A store in remote mode over the given backend.
    pub fn with_backend(app_id: &str, backend: Arc<dyn RemoteBackend>) -> Self {
        Self::assemble(app_id, Some(backend))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Builds the store described by `config`. Never fails: a missing or
    /// placeholder backend, or one that can't be reached, yields a mock store.
    pub async fn connect(config: &AppConfig) -> Self {
        let store = match config.usable_backend() {
            None => {
                let reason = StoreError::Configuration(
                    "no backend credentials configured".to_string(),
                );
                warn!(error = %reason, "Starting in mock mode");
                Self::mock(&config.app_id)
            }
            Some(backend) => match SqlBackend::connect(&backend.database_url, &config.app_id).await {
                Ok(sql) => Self::with_backend(&config.app_id, Arc::new(sql)),
                Err(e) => {
                    warn!(error = %e, "Backend unavailable, starting in mock mode");
                    Self::mock(&config.app_id)
                }
            },
        }
        .with_poll_interval(config.poll_interval);

        if store.mode() == StoreMode::Remote {
            if let Some(redis_url) = &config.redis_url {
                match RedisChangeFeed::connect(
                    redis_url,
                    &store.app_id,
                    store.instance_id,
                    store.changes.clone(),
                )
                .await
                {
                    Ok(feed) => store.attach_change_feed(Arc::new(feed)),
                    Err(e) => warn!(error = %e, "Change feed unavailable, push updates stay local"),
                }
            }
        }

        info!(app_id = %store.app_id, mode = ?store.mode(), "Data store ready");
        store
    }

    pub fn attach_change_feed(&self, feed: Arc<RedisChangeFeed>) {
        if self.change_feed.set(feed).is_err() {
            debug!("Change feed already attached");
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn mode(&self) -> StoreMode {
        if self.remote().is_some() {
            StoreMode::Remote
        } else {
            StoreMode::Mock
        }
    }

    /// Observes mode transitions. The only transition is Remote → Mock.
    pub fn mode_events(&self) -> watch::Receiver<StoreMode> {
        self.mode_tx.subscribe()
    }

    pub fn changes(&self) -> broadcast::Receiver<JobChange> {
        self.changes.subscribe()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Switches to mock mode for good. Later calls are no-ops.
    pub fn degrade(&self, operation: &str, error: &StoreError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(
                operation,
                error = %error,
                "Remote backend failed, switching to mock mode for the rest of the session"
            );
            self.mode_tx.send_replace(StoreMode::Mock);
        }
    }

    fn remote(&self) -> Option<&Arc<dyn RemoteBackend>> {
        if self.degraded.load(Ordering::SeqCst) {
            None
        } else {
            self.backend.as_ref()
        }
    }

    fn publish(&self, job: &Job) {
        let change = JobChange {
            job_id: job.id.clone(),
            brand_id: job.brand_id.clone(),
            origin: self.instance_id,
        };
        // No local subscribers is fine.
        let _ = self.changes.send(change.clone());

        if self.mode() == StoreMode::Remote {
            if let Some(feed) = self.change_feed.get() {
                let feed = feed.clone();
                tokio::spawn(async move {
                    if let Err(e) = feed.publish(&change).await {
                        warn!(job_id = %change.job_id, error = %e, "Failed to publish job change");
                    }
                });
            }
        }
    }

    // ── Profiles ──

    pub async fn read_profile(&self, uid: &str) -> Option<UserProfile> {
        if let Some(backend) = self.remote() {
            match backend.read_profile(uid).await {
                Ok(profile) => return profile,
                Err(e) => self.degrade("read_profile", &e),
            }
        }
        self.mock.read_profile(uid).await
    }

    /// Merges `patch` into the stored profile, creating it if there is none.
    /// Only validation errors come back.
    pub async fn write_profile(&self, uid: &str, patch: &ProfilePatch) -> MarketResult<UserProfile> {
        if let Some(backend) = self.remote() {
            match backend.read_profile(uid).await {
                Ok(existing) => {
                    let profile = merge_or_create(uid, existing.as_ref(), patch)?;
                    match backend.write_profile(&profile).await {
                        Ok(()) => {
                            debug!(uid, "Profile written");
                            return Ok(profile);
                        }
                        Err(e) => {
                            self.degrade("write_profile", &e);
                            self.mock.write_profile(profile.clone()).await;
                            return Ok(profile);
                        }
                    }
                }
                Err(e) => self.degrade("write_profile", &e),
            }
        }
        self.mock.merge_profile(uid, patch).await
    }

    // ── Jobs ──

    /// Persists a new job as `Pending Match` / `Unpaid`. Callers validate first.
    pub async fn create_job(&self, input: NewJob) -> Job {
        let job = Job::from_new(new_job_id(), input, Utc::now());

        if let Some(backend) = self.remote() {
            match backend.insert_job(&job).await {
                Ok(()) => {
                    self.publish(&job);
                    return job;
                }
                Err(e) => self.degrade("create_job", &e),
            }
        }
        self.mock.insert_job(job.clone()).await;
        self.publish(&job);
        job
    }

    pub async fn get_job(&self, id: &str) -> Option<Job> {
        if let Some(backend) = self.remote() {
            match backend.get_job(id).await {
                Ok(job) => return job,
                Err(e) => self.degrade("get_job", &e),
            }
        }
        self.mock.get_job(id).await
    }

    /// Unconditional partial update. `None` if the job doesn't exist.
    pub async fn update_job(&self, id: &str, patch: &JobPatch) -> Option<Job> {
        match self.update_job_guarded(id, patch, &JobGuard::any()).await {
            UpdateOutcome::Updated(job) => Some(job),
            UpdateOutcome::Missing | UpdateOutcome::Rejected(_) => None,
        }
    }

    /// Partial update that only happens if `guard` holds at write time.
    pub async fn update_job_guarded(
        &self,
        id: &str,
        patch: &JobPatch,
        guard: &JobGuard,
    ) -> UpdateOutcome {
        let outcome = match self.remote() {
            Some(backend) => match backend.update_job(id, patch, guard).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.degrade("update_job", &e);
                    self.mock.update_job(id, patch, guard).await
                }
            },
            None => self.mock.update_job(id, patch, guard).await,
        };

        if let UpdateOutcome::Updated(job) = &outcome {
            self.publish(job);
        }
        outcome
    }

    /// Guarded update as a result: `NotFound` for an unknown id, `Conflict`
    /// when the job has already moved past what `guard` allows.
    pub async fn transition_job(
        &self,
        id: &str,
        patch: &JobPatch,
        guard: &JobGuard,
    ) -> MarketResult<Job> {
        match self.update_job_guarded(id, patch, guard).await {
            UpdateOutcome::Updated(job) => Ok(job),
            UpdateOutcome::Missing => Err(MarketError::job_not_found(id)),
            UpdateOutcome::Rejected(current) => Err(MarketError::Conflict(format!(
                "job {} is already {} with escrow {:?}",
                id,
                current.status.as_str(),
                current.escrow_status
            ))),
        }
    }

    /// Jobs matching `filter`, newest first.
    pub async fn list_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        if let Some(backend) = self.remote() {
            match backend.list_jobs(filter).await {
                Ok(mut jobs) => {
                    sort_newest_first(&mut jobs);
                    return jobs;
                }
                Err(e) => self.degrade("list_jobs", &e),
            }
        }
        self.mock.list_jobs(filter).await
    }
}

fn new_job_id() -> String {
    format!("job-{}", Uuid::new_v4().simple())
}
