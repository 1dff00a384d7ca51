use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::MarketResult;
use crate::models::jobs::{
    EscrowStatus, Job, JobFilter, JobGuard, JobPatch, JobStatus, Sizing, UpdateOutcome,
    sort_newest_first,
};
use crate::models::profiles::{ProfilePatch, UserProfile, merge_or_create};

/// Uid that the seeded history job is assigned to.
pub const MOCK_DEV_UID: &str = "mock-user-dev";

#[derive(Default)]
struct MockState {
    jobs: Vec<Job>,
    profiles: HashMap<String, UserProfile>,
}

/// In-process stand-in for the remote backend. One lock covers jobs and
/// profiles, so a reader never sees a half-applied write.
pub struct MockStore {
    state: RwLock<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
        }
    }

    /// A store pre-populated with a few jobs so dashboards aren't empty.
    pub fn seeded() -> Self {
        Self {
            state: RwLock::new(MockState {
                jobs: seed_jobs(),
                profiles: HashMap::new(),
            }),
        }
    }

    pub async fn read_profile(&self, uid: &str) -> Option<UserProfile> {
        self.state.read().await.profiles.get(uid).cloned()
    }

    pub async fn write_profile(&self, profile: UserProfile) {
        self.state
            .write()
            .await
            .profiles
            .insert(profile.uid.clone(), profile);
    }

    /// Read-merge-write under a single lock.
    pub async fn merge_profile(&self, uid: &str, patch: &ProfilePatch) -> MarketResult<UserProfile> {
        let mut state = self.state.write().await;
        let profile = merge_or_create(uid, state.profiles.get(uid), patch)?;
        state.profiles.insert(uid.to_string(), profile.clone());
        Ok(profile)
    }

    pub async fn insert_job(&self, job: Job) {
        self.state.write().await.jobs.push(job);
    }

    pub async fn get_job(&self, id: &str) -> Option<Job> {
        self.state
            .read()
            .await
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
    }

    pub async fn update_job(&self, id: &str, patch: &JobPatch, guard: &JobGuard) -> UpdateOutcome {
        let mut state = self.state.write().await;
        let Some(job) = state.jobs.iter_mut().find(|j| j.id == id) else {
            return UpdateOutcome::Missing;
        };
        if !guard.admits(job) {
            return UpdateOutcome::Rejected(job.clone());
        }
        patch.apply(job);
        UpdateOutcome::Updated(job.clone())
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .state
            .read()
            .await
            .jobs
            .iter()
            .filter(|j| filter.matches(&j.brand_id))
            .cloned()
            .collect();
        sort_newest_first(&mut jobs);
        jobs
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::seeded()
    }
}

fn seed_jobs() -> Vec<Job> {
    let now = Utc::now();
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

    vec![
        Job {
            id: "job-preload-1".to_string(),
            garment_type: "Wedding Dress".to_string(),
            quantity: 1,
            sizing: Sizing::new(1, 0, 0, 0),
            fabric_type: "Silk Satin".to_string(),
            deadline: date(2024, 12, 1),
            budget: 2500,
            design_files: Vec::new(),
            brand_id: "brand-1".to_string(),
            brand_name: "Bridal Elegance".to_string(),
            created_at: now - Duration::seconds(100),
            status: JobStatus::PendingMatch,
            escrow_status: EscrowStatus::Unpaid,
            tailor_id: None,
            tailor_name: None,
        },
        Job {
            id: "job-preload-2".to_string(),
            garment_type: "Denim Jackets".to_string(),
            quantity: 50,
            sizing: Sizing::new(10, 20, 15, 5),
            fabric_type: "Heavy Denim".to_string(),
            deadline: date(2024, 11, 15),
            budget: 4000,
            design_files: Vec::new(),
            brand_id: "brand-2".to_string(),
            brand_name: "Urban Outfitters Co.".to_string(),
            created_at: now - Duration::seconds(200),
            status: JobStatus::InProduction,
            escrow_status: EscrowStatus::Held,
            tailor_id: Some("tailor-2".to_string()),
            tailor_name: Some("Urban Stitch Co.".to_string()),
        },
        Job {
            id: "job-preload-3".to_string(),
            garment_type: "Linen Suits".to_string(),
            quantity: 5,
            sizing: Sizing::new(0, 2, 2, 1),
            fabric_type: "Italian Linen".to_string(),
            deadline: date(2024, 10, 30),
            budget: 1500,
            design_files: Vec::new(),
            brand_id: "brand-3".to_string(),
            brand_name: "Gentlemans Club".to_string(),
            created_at: now - Duration::seconds(5000),
            status: JobStatus::Completed,
            escrow_status: EscrowStatus::Released,
            tailor_id: Some(MOCK_DEV_UID.to_string()),
            tailor_name: Some("Me".to_string()),
        },
    ]
}
