use futures_util::future::BoxFuture;

use crate::error::StoreError;
use crate::models::jobs::{Job, JobFilter, JobGuard, JobPatch, UpdateOutcome};
use crate::models::profiles::UserProfile;

pub type BackendResult<T> = Result<T, StoreError>;

/// A persistent backend the store talks to while it is in remote mode.
///
/// Implementations scope every record by the application id they were built
/// with. Any `Err` makes the store fall back to its in-memory copy for good.
pub trait RemoteBackend: Send + Sync {
    fn read_profile<'a>(&'a self, uid: &'a str) -> BoxFuture<'a, BackendResult<Option<UserProfile>>>;

    /// Stores the full merged profile, replacing the previous document.
    fn write_profile<'a>(&'a self, profile: &'a UserProfile) -> BoxFuture<'a, BackendResult<()>>;

    fn insert_job<'a>(&'a self, job: &'a Job) -> BoxFuture<'a, BackendResult<()>>;

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, BackendResult<Option<Job>>>;

    /// Applies `patch` only if `guard` holds for the stored row.
    fn update_job<'a>(
        &'a self,
        id: &'a str,
        patch: &'a JobPatch,
        guard: &'a JobGuard,
    ) -> BoxFuture<'a, BackendResult<UpdateOutcome>>;

    /// Newest first.
    fn list_jobs<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, BackendResult<Vec<Job>>>;
}
