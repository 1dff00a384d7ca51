use actix_web::{HttpResponse, web};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::MarketResult;
use crate::models::profiles::ProfileEdit;
use crate::services::ProfileService;

/// PATCH /api/profile: merge edits into the caller's profile.
pub async fn update_profile(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
    body: web::Json<ProfileEdit>,
) -> MarketResult<HttpResponse> {
    let profile = profiles.update_profile(&user.uid, &body).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/profile/image: simulated avatar upload.
pub async fn upload_image(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    let profile = profiles.upload_profile_image(&user.uid).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/profile/portfolio: simulated portfolio upload (tailors).
pub async fn add_portfolio_image(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    let profile = profiles.add_portfolio_image(&user.uid).await?;
    Ok(HttpResponse::Ok().json(profile))
}
