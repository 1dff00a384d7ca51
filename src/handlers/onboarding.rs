use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::middleware::AuthenticatedUser;
use crate::config::AppConfig;
use crate::error::MarketResult;
use crate::models::profiles::RateCardItem;
use crate::services::{OnboardingDrafts, ProfileService};

#[derive(Debug, Deserialize)]
pub struct BrandOnboarding {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub display_name: String,
    pub experience_years: Option<u32>,
}

/// POST /api/onboarding/brand
pub async fn onboard_brand(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
    body: web::Json<BrandOnboarding>,
) -> MarketResult<HttpResponse> {
    let profile = profiles
        .onboard_brand(&user.uid, &user.email, &body.name)
        .await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/onboarding/tailor: the current wizard draft.
pub async fn tailor_draft(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
) -> MarketResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(drafts.load(&user.uid).await))
}

/// PUT /api/onboarding/tailor/basic: step 1.
pub async fn tailor_basic_info(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
    body: web::Json<BasicInfo>,
) -> MarketResult<HttpResponse> {
    let mut draft = drafts.load(&user.uid).await;
    draft.basic_info(&body.display_name, body.experience_years);
    drafts.save(&user.uid, draft.clone()).await;
    Ok(HttpResponse::Ok().json(draft))
}

/// POST /api/onboarding/tailor/specialties/{skill}: step 2, select or deselect.
pub async fn tailor_toggle_specialty(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
    path: web::Path<String>,
) -> MarketResult<HttpResponse> {
    let skill = path.into_inner();
    let mut draft = drafts.load(&user.uid).await;
    draft.toggle_specialty(&skill);
    drafts.save(&user.uid, draft.clone()).await;
    Ok(HttpResponse::Ok().json(draft))
}

/// PUT /api/onboarding/tailor/rates: step 2, price the selected skills.
/// All rates apply or none do.
pub async fn tailor_set_rates(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
    body: web::Json<Vec<RateCardItem>>,
) -> MarketResult<HttpResponse> {
    let mut draft = drafts.load(&user.uid).await;
    for item in body.iter() {
        draft.set_rate(&item.skill, item.base_rate)?;
    }
    drafts.save(&user.uid, draft.clone()).await;
    Ok(HttpResponse::Ok().json(draft))
}

/// POST /api/onboarding/tailor/portfolio: step 3, simulated upload.
pub async fn tailor_upload_portfolio(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
) -> MarketResult<HttpResponse> {
    let mut draft = drafts.load(&user.uid).await;
    draft.upload_portfolio_file();
    drafts.save(&user.uid, draft.clone()).await;
    Ok(HttpResponse::Ok().json(draft))
}

/// POST /api/onboarding/tailor/kyc: step 4, simulated identity check.
pub async fn tailor_verify_identity(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
    config: web::Data<AppConfig>,
) -> MarketResult<HttpResponse> {
    let mut draft = drafts.load(&user.uid).await;
    draft
        .verify_identity(config.delays.identity_verification)
        .await;
    drafts.save(&user.uid, draft.clone()).await;
    Ok(HttpResponse::Ok().json(draft))
}

/// POST /api/onboarding/tailor/submit: create the tailor profile.
pub async fn tailor_submit(
    user: AuthenticatedUser,
    drafts: web::Data<OnboardingDrafts>,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    let draft = drafts.load(&user.uid).await;
    let profile = profiles
        .onboard_tailor(&user.uid, &user.email, draft)
        .await?;
    drafts.discard(&user.uid).await;
    Ok(HttpResponse::Created().json(profile))
}
