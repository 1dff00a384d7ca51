use crate::error::{MarketError, MarketResult};
use crate::models::jobs::Job;
use crate::models::profiles::{Role, UserProfile};
use crate::services::ProfileService;

/// Loads the caller's profile and checks it has `role`.
pub async fn require_role(
    profiles: &ProfileService,
    uid: &str,
    role: Role,
) -> MarketResult<UserProfile> {
    let profile = profiles.get_profile(uid).await?;
    if profile.role() != role {
        return Err(MarketError::Forbidden(format!(
            "this action is only available to {role:?} accounts"
        )));
    }
    Ok(profile)
}

pub fn verify_job_owner(job: &Job, uid: &str) -> MarketResult<()> {
    if job.brand_id != uid {
        return Err(MarketError::Forbidden("You do not own this job".to_string()));
    }
    Ok(())
}
