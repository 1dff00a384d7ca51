use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::auth::identity::{IdentityProvider, IdentitySource};
use crate::auth::jwt::SessionKeys;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::otp::OtpIssuer;
use crate::error::{MarketError, MarketResult};
use crate::models::profiles::UserProfile;
use crate::services::ProfileService;

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub provider: IdentitySource,
    /// Absent until the user has been onboarded.
    pub profile: Option<UserProfile>,
}

/// POST /api/auth/otp: send a (simulated) one-time code.
pub async fn request_otp(
    otp: web::Data<OtpIssuer>,
    body: web::Json<OtpRequest>,
) -> MarketResult<HttpResponse> {
    let notification = otp.issue(&body.email).await?;
    Ok(HttpResponse::Ok().json(notification))
}

/// POST /api/auth/verify: check the code and open a session.
pub async fn verify_otp(
    otp: web::Data<OtpIssuer>,
    identity: web::Data<IdentityProvider>,
    keys: web::Data<SessionKeys>,
    profiles: web::Data<ProfileService>,
    body: web::Json<VerifyRequest>,
) -> MarketResult<HttpResponse> {
    let email = otp.verify(&body.email, &body.code).await?;
    let identity = identity.authenticate(&email).await;

    let token = keys
        .mint(&identity.uid, &identity.email)
        .map_err(MarketError::Unauthorized)?;
    let profile = profiles.get_profile(&identity.uid).await.ok();

    Ok(HttpResponse::Ok().json(SessionResponse {
        token,
        uid: identity.uid,
        email: identity.email,
        provider: identity.source,
        profile,
    }))
}

/// GET /api/auth/me: the caller's profile; 404 until onboarding is done.
pub async fn me(
    user: AuthenticatedUser,
    profiles: web::Data<ProfileService>,
) -> MarketResult<HttpResponse> {
    let profile = profiles.get_profile(&user.uid).await?;
    Ok(HttpResponse::Ok().json(profile))
}
