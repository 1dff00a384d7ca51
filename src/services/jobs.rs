use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::SimulatedDelays;
use crate::error::{MarketError, MarketResult};
use crate::models::jobs::{
    CreateJob, EscrowStatus, Job, JobFilter, JobGuard, JobPatch, JobStatus, MAX_QUANTITY, NewJob,
};
use crate::models::recommendations::TailorRecommendation;
use crate::services::simulated;
use crate::store::DataStore;

/// What a tailor's dashboard shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorBoard {
    /// Every job still waiting for a tailor.
    pub open: Vec<Job>,
    pub active: Vec<Job>,
    pub history: Vec<Job>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub active_orders: usize,
    pub total_invested: i64,
}

/// Drives jobs through `Pending Match` → `In Production`, with escrow moving
/// `Unpaid` → `Held` alongside.
#[derive(Clone)]
pub struct JobService {
    store: Arc<DataStore>,
    delays: SimulatedDelays,
}

impl JobService {
    pub fn new(store: Arc<DataStore>, delays: SimulatedDelays) -> Self {
        Self { store, delays }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Validates and posts a new order for `brand_id`. Nothing is written when
    /// validation fails.
    pub async fn create_job(
        &self,
        brand_id: &str,
        brand_name: &str,
        input: CreateJob,
    ) -> MarketResult<Job> {
        validate_new_job(&input)?;

        let job = self
            .store
            .create_job(NewJob::from_request(brand_id, brand_name, input))
            .await;
        info!(job_id = %job.id, brand_id, quantity = job.quantity, "Job posted");
        Ok(job)
    }

    pub async fn get_job(&self, job_id: &str) -> MarketResult<Job> {
        self.store
            .get_job(job_id)
            .await
            .ok_or_else(|| MarketError::job_not_found(job_id))
    }

    /// A tailor takes an open job. Only a `Pending Match` job can be accepted;
    /// of two racing tailors the second gets `Conflict`.
    pub async fn accept_job(&self, job_id: &str, tailor_id: &str) -> MarketResult<Job> {
        if tailor_id.trim().is_empty() {
            return Err(MarketError::validation("tailor id is required"));
        }

        let patch = JobPatch {
            status: Some(JobStatus::InProduction),
            tailor_id: Some(tailor_id.to_string()),
            ..Default::default()
        };
        let guard = JobGuard {
            status_in: vec![JobStatus::PendingMatch],
            escrow: None,
        };

        let job = self.store.transition_job(job_id, &patch, &guard).await?;
        info!(job_id, tailor_id, "Job accepted");
        Ok(job)
    }

    /// The brand pays into escrow for `tailor_id`. After the simulated payment
    /// the job is `In Production` with escrow `Held`, assigned to that tailor.
    pub async fn fund_escrow(
        &self,
        job_id: &str,
        tailor_id: &str,
        tailor_name: &str,
    ) -> MarketResult<Job> {
        if tailor_id.trim().is_empty() {
            return Err(MarketError::validation("tailor id is required"));
        }
        // Fail fast on unknown ids instead of after the payment delay.
        self.get_job(job_id).await?;

        simulated::latency(self.delays.escrow_payment, "escrow payment").await;

        let patch = JobPatch {
            status: Some(JobStatus::InProduction),
            escrow_status: Some(EscrowStatus::Held),
            tailor_id: Some(tailor_id.to_string()),
            tailor_name: Some(tailor_name.to_string()),
        };
        let guard = JobGuard {
            status_in: vec![JobStatus::PendingMatch, JobStatus::InProduction],
            escrow: Some(EscrowStatus::Unpaid),
        };

        let job = self.store.transition_job(job_id, &patch, &guard).await?;
        info!(job_id, tailor_id, tailor_name, "Escrow funded");
        Ok(job)
    }

    pub async fn recommend_tailors(&self, garment_type: &str) -> Vec<TailorRecommendation> {
        simulated::latency(self.delays.recommendations, "tailor matching").await;
        let recommendations = simulated::recommended_tailors();
        tracing::debug!(garment_type, count = recommendations.len(), "Tailors recommended");
        recommendations
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        self.store.list_jobs(filter).await
    }

    pub async fn tailor_board(&self, tailor_id: &str) -> TailorBoard {
        let jobs = self.store.list_jobs(&JobFilter::all()).await;
        let mine = |j: &&Job, status: JobStatus| {
            j.status == status && j.tailor_id.as_deref() == Some(tailor_id)
        };

        TailorBoard {
            open: jobs
                .iter()
                .filter(|j| j.status == JobStatus::PendingMatch)
                .cloned()
                .collect(),
            active: jobs
                .iter()
                .filter(|j| mine(j, JobStatus::InProduction))
                .cloned()
                .collect(),
            history: jobs
                .iter()
                .filter(|j| mine(j, JobStatus::Completed))
                .cloned()
                .collect(),
        }
    }

    pub async fn brand_summary(&self, brand_id: &str) -> BrandSummary {
        let jobs = self.store.list_jobs(&JobFilter::brand(brand_id)).await;
        BrandSummary {
            active_orders: jobs
                .iter()
                .filter(|j| j.status != JobStatus::Completed)
                .count(),
            total_invested: jobs
                .iter()
                .fold(0i64, |total, j| total.saturating_add(j.budget)),
        }
    }
}

fn validate_new_job(input: &CreateJob) -> MarketResult<()> {
    if input.garment_type.trim().is_empty() {
        return Err(MarketError::validation("garment type is required"));
    }
    match input.sizing.total() {
        Some(0) => {
            return Err(MarketError::validation(
                "total quantity must be greater than zero",
            ));
        }
        None => {
            return Err(MarketError::validation(format!(
                "total quantity cannot exceed {MAX_QUANTITY}"
            )));
        }
        Some(_) => {}
    }
    if input.budget < 0 {
        return Err(MarketError::validation("budget cannot be negative"));
    }
    Ok(())
}
