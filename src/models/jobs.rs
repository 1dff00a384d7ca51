use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Production status of a job, stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum JobStatus {
    #[sea_orm(string_value = "pending_match")]
    #[serde(rename = "Pending Match")]
    PendingMatch,
    #[sea_orm(string_value = "in_production")]
    #[serde(rename = "In Production")]
    InProduction,
    #[sea_orm(string_value = "completed")]
    #[serde(rename = "Completed")]
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::PendingMatch => "Pending Match",
            JobStatus::InProduction => "In Production",
            JobStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EscrowStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "held")]
    Held,
    #[sea_orm(string_value = "released")]
    Released,
}

/// SeaORM entity for the `jobs` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub app_id: String,
    pub garment_type: String,
    pub quantity: i32,
    pub size_s: i32,
    pub size_m: i32,
    pub size_l: i32,
    pub size_xl: i32,
    pub fabric_type: String,
    pub deadline: Date,
    pub budget: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub design_files: Json,
    pub brand_id: String,
    pub brand_name: String,
    pub status: JobStatus,
    pub escrow_status: EscrowStatus,
    pub tailor_id: Option<String>,
    pub tailor_name: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── Domain ──

/// Largest piece count a job (or any single size) can carry; quantity columns are `INTEGER`.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// Per-size piece counts of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sizing {
    #[serde(default)]
    pub s: u32,
    #[serde(default)]
    pub m: u32,
    #[serde(default)]
    pub l: u32,
    #[serde(default)]
    pub xl: u32,
}

impl Sizing {
    pub fn new(s: u32, m: u32, l: u32, xl: u32) -> Self {
        Self { s, m, l, xl }
    }

    /// Sum of all buckets, or `None` once it no longer fits a quantity column.
    pub fn total(&self) -> Option<u32> {
        self.s
            .checked_add(self.m)?
            .checked_add(self.l)?
            .checked_add(self.xl)
            .filter(|total| *total <= MAX_QUANTITY)
    }
}

/// A production order as handed to callers and serialized over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub garment_type: String,
    pub quantity: u32,
    pub sizing: Sizing,
    pub fabric_type: String,
    pub deadline: NaiveDate,
    pub budget: i64,
    #[serde(default)]
    pub design_files: Vec<String>,
    pub brand_id: String,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
    pub escrow_status: EscrowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailor_name: Option<String>,
}

impl Job {
    /// Builds a fresh `Pending Match` / `Unpaid` job.
    pub fn from_new(id: String, input: NewJob, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            // Orders reach the store only after the job service has checked the total.
            quantity: input.sizing.total().unwrap_or(MAX_QUANTITY),
            garment_type: input.garment_type,
            sizing: input.sizing,
            fabric_type: input.fabric_type,
            deadline: input.deadline,
            budget: input.budget,
            design_files: input.design_files,
            brand_id: input.brand_id,
            brand_name: input.brand_name,
            created_at,
            status: JobStatus::PendingMatch,
            escrow_status: EscrowStatus::Unpaid,
            tailor_id: None,
            tailor_name: None,
        }
    }

    pub fn to_active_model(&self, app_id: &str) -> ActiveModel {
        use sea_orm::ActiveValue::Set;

        ActiveModel {
            id: Set(self.id.clone()),
            app_id: Set(app_id.to_string()),
            garment_type: Set(self.garment_type.clone()),
            quantity: Set(to_column_count(self.quantity)),
            size_s: Set(to_column_count(self.sizing.s)),
            size_m: Set(to_column_count(self.sizing.m)),
            size_l: Set(to_column_count(self.sizing.l)),
            size_xl: Set(to_column_count(self.sizing.xl)),
            fabric_type: Set(self.fabric_type.clone()),
            deadline: Set(self.deadline),
            budget: Set(self.budget),
            design_files: Set(serde_json::json!(self.design_files)),
            brand_id: Set(self.brand_id.clone()),
            brand_name: Set(self.brand_name.clone()),
            status: Set(self.status),
            escrow_status: Set(self.escrow_status),
            tailor_id: Set(self.tailor_id.clone()),
            tailor_name: Set(self.tailor_name.clone()),
            created_at: Set(self.created_at),
        }
    }
}

impl From<Model> for Job {
    fn from(m: Model) -> Self {
        let sizing = Sizing {
            s: from_column_count(m.size_s),
            m: from_column_count(m.size_m),
            l: from_column_count(m.size_l),
            xl: from_column_count(m.size_xl),
        };
        Self {
            id: m.id,
            garment_type: m.garment_type,
            quantity: from_column_count(m.quantity),
            sizing,
            fabric_type: m.fabric_type,
            deadline: m.deadline,
            budget: m.budget,
            design_files: serde_json::from_value(m.design_files).unwrap_or_default(),
            brand_id: m.brand_id,
            brand_name: m.brand_name,
            created_at: m.created_at,
            status: m.status,
            escrow_status: m.escrow_status,
            tailor_id: m.tailor_id,
            tailor_name: m.tailor_name,
        }
    }
}

fn to_column_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn from_column_count(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}

/// Orders a job list newest-first; equal timestamps fall back to id so the
/// order is stable across reads.
pub fn sort_newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

// ── DTOs ──

/// Request body for `POST /api/jobs`. Brand identity comes from the session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    pub garment_type: String,
    pub sizing: Sizing,
    pub fabric_type: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub budget: i64,
    #[serde(default)]
    pub design_files: Vec<String>,
}

/// Everything the store needs to persist a new job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub brand_id: String,
    pub brand_name: String,
    pub garment_type: String,
    pub sizing: Sizing,
    pub fabric_type: String,
    pub deadline: NaiveDate,
    pub budget: i64,
    pub design_files: Vec<String>,
}

impl NewJob {
    pub fn from_request(brand_id: &str, brand_name: &str, input: CreateJob) -> Self {
        Self {
            brand_id: brand_id.to_string(),
            brand_name: brand_name.to_string(),
            garment_type: input.garment_type,
            sizing: input.sizing,
            fabric_type: input.fabric_type,
            deadline: input.deadline,
            budget: input.budget,
            design_files: input.design_files,
        }
    }
}

/// Partial update of the lifecycle fields of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub escrow_status: Option<EscrowStatus>,
    pub tailor_id: Option<String>,
    pub tailor_name: Option<String>,
}

impl JobPatch {
    pub fn apply(&self, job: &mut Job) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(escrow) = self.escrow_status {
            job.escrow_status = escrow;
        }
        if let Some(tailor_id) = &self.tailor_id {
            job.tailor_id = Some(tailor_id.clone());
        }
        if let Some(tailor_name) = &self.tailor_name {
            job.tailor_name = Some(tailor_name.clone());
        }
    }
}

/// Compare-and-set precondition checked atomically with a job update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobGuard {
    /// Empty means any status.
    pub status_in: Vec<JobStatus>,
    pub escrow: Option<EscrowStatus>,
}

impl JobGuard {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn admits(&self, job: &Job) -> bool {
        let status_ok = self.status_in.is_empty() || self.status_in.contains(&job.status);
        let escrow_ok = self.escrow.is_none_or(|e| e == job.escrow_status);
        status_ok && escrow_ok
    }
}

/// Result of a guarded update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Job),
    Missing,
    /// The guard did not hold; carries the job as it currently is.
    Rejected(Job),
}

/// Optional equality filter on the owning brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobFilter {
    pub brand_id: Option<String>,
}

impl JobFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn brand(brand_id: impl Into<String>) -> Self {
        Self {
            brand_id: Some(brand_id.into()),
        }
    }

    pub fn matches(&self, brand_id: &str) -> bool {
        self.brand_id.as_deref().is_none_or(|b| b == brand_id)
    }
}
