use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::authorization::{require_role, verify_job_owner};
use crate::auth::middleware::AuthenticatedUser;
use crate::error::MarketResult;
use crate::models::jobs::{CreateJob, JobFilter};
use crate::models::profiles::Role;
use crate::services::simulated;
use crate::services::{JobService, ProfileService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundEscrow {
    pub tailor_id: String,
    pub tailor_name: String,
}

/// GET /api/jobs?brand_id=: newest first, optionally one brand's only.
pub async fn list_jobs(
    _user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    query: web::Query<JobFilter>,
) -> MarketResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(jobs.list_jobs(&query).await))
}

/// POST /api/jobs: a brand posts an order.
pub async fn create_job(
    user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    profiles: web::Data<ProfileService>,
    body: web::Json<CreateJob>,
) -> MarketResult<HttpResponse> {
    let brand = require_role(&profiles, &user.uid, Role::Brand).await?;
    let job = jobs
        .create_job(&user.uid, brand.brand_name(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(job))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    _user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    path: web::Path<String>,
) -> MarketResult<HttpResponse> {
    let job = jobs.get_job(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/jobs/{id}/accept: a tailor takes an open job.
pub async fn accept_job(
    user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    profiles: web::Data<ProfileService>,
    path: web::Path<String>,
) -> MarketResult<HttpResponse> {
    require_role(&profiles, &user.uid, Role::Tailor).await?;
    let job = jobs.accept_job(&path.into_inner(), &user.uid).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/jobs/{id}/escrow: the owning brand pays for a chosen tailor.
pub async fn fund_escrow(
    user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    profiles: web::Data<ProfileService>,
    path: web::Path<String>,
    body: web::Json<FundEscrow>,
) -> MarketResult<HttpResponse> {
    let job_id = path.into_inner();
    require_role(&profiles, &user.uid, Role::Brand).await?;
    verify_job_owner(&jobs.get_job(&job_id).await?, &user.uid)?;

    let job = jobs
        .fund_escrow(&job_id, &body.tailor_id, &body.tailor_name)
        .await?;
    Ok(HttpResponse::Ok().json(job))
}

/// GET /api/jobs/{id}/recommendations: simulated tailor matching.
pub async fn recommendations(
    _user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    path: web::Path<String>,
) -> MarketResult<HttpResponse> {
    let job = jobs.get_job(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(jobs.recommend_tailors(&job.garment_type).await))
}

/// POST /api/jobs/design-files: simulated upload; returns the stored names
/// for the client to attach to its next order.
pub async fn upload_design_files(_user: AuthenticatedUser) -> MarketResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "files": simulated::design_file_names(),
    })))
}

/// GET /api/jobs/board: open, active and past jobs for the calling tailor.
pub async fn tailor_board(
    user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    require_role(&profiles, &user.uid, Role::Tailor).await?;
    Ok(HttpResponse::Ok().json(jobs.tailor_board(&user.uid).await))
}

/// GET /api/jobs/summary: order count and spend for the calling brand.
pub async fn brand_summary(
    user: AuthenticatedUser,
    jobs: web::Data<JobService>,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    require_role(&profiles, &user.uid, Role::Brand).await?;
    Ok(HttpResponse::Ok().json(jobs.brand_summary(&user.uid).await))
}
