#![allow(dead_code)]

use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use stitch_cloud::config::SimulatedDelays;
use stitch_cloud::error::StoreError;
use stitch_cloud::models::jobs::{Job, JobFilter, JobGuard, JobPatch, UpdateOutcome};
use stitch_cloud::models::profiles::UserProfile;
use stitch_cloud::services::{JobService, ProfileService};
use stitch_cloud::store::backend::{BackendResult, RemoteBackend};
use stitch_cloud::store::mock::MockStore;
use stitch_cloud::store::DataStore;

pub const APP_ID: &str = "stitch-cloud-test";

/// A remote backend held in memory. It counts calls and can be told to start
/// failing, which is how the tests simulate an outage.
pub struct InMemoryBackend {
    inner: MockStore,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: MockStore::new(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let backend = Self::new();
        backend.fail_from_now();
        backend
    }

    pub fn fail_from_now(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn stored_jobs(&self) -> Vec<Job> {
        self.inner.list_jobs(&JobFilter::all()).await
    }

    fn check(&self) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl RemoteBackend for InMemoryBackend {
    fn read_profile<'a>(&'a self, uid: &'a str) -> BoxFuture<'a, BackendResult<Option<UserProfile>>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.inner.read_profile(uid).await)
        })
    }

    fn write_profile<'a>(&'a self, profile: &'a UserProfile) -> BoxFuture<'a, BackendResult<()>> {
        Box::pin(async move {
            self.check()?;
            self.inner.write_profile(profile.clone()).await;
            Ok(())
        })
    }

    fn insert_job<'a>(&'a self, job: &'a Job) -> BoxFuture<'a, BackendResult<()>> {
        Box::pin(async move {
            self.check()?;
            self.inner.insert_job(job.clone()).await;
            Ok(())
        })
    }

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, BackendResult<Option<Job>>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.inner.get_job(id).await)
        })
    }

    fn update_job<'a>(
        &'a self,
        id: &'a str,
        patch: &'a JobPatch,
        guard: &'a JobGuard,
    ) -> BoxFuture<'a, BackendResult<UpdateOutcome>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.inner.update_job(id, patch, guard).await)
        })
    }

    fn list_jobs<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, BackendResult<Vec<Job>>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.inner.list_jobs(filter).await)
        })
    }
}

pub fn mock_store() -> Arc<DataStore> {
    Arc::new(DataStore::mock(APP_ID))
}

pub fn remote_store(backend: Arc<InMemoryBackend>) -> Arc<DataStore> {
    Arc::new(DataStore::with_backend(APP_ID, backend))
}

pub fn job_service(store: &Arc<DataStore>) -> JobService {
    JobService::new(store.clone(), SimulatedDelays::none())
}

pub fn profile_service(store: &Arc<DataStore>) -> ProfileService {
    ProfileService::new(store.clone())
}
