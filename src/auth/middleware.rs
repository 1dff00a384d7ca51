use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use crate::auth::jwt::SessionKeys;

/// The caller behind a valid session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
}

impl AuthenticatedUser {
    /// Authenticates a raw token. Used where no header is available, such as
    /// the WebSocket handshake.
    pub fn from_token(token: &str, keys: &SessionKeys) -> Result<Self, Error> {
        let claims = keys
            .validate(token)
            .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

        Ok(Self {
            uid: claims.sub,
            email: claims.email,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    // 1. Extract the Bearer token from the Authorization header.
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("Missing Authorization header"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        actix_web::error::ErrorUnauthorized("Authorization header must be: Bearer <token>")
    })?;

    // 2. Get the session keys from app data.
    let keys = req.app_data::<web::Data<SessionKeys>>().ok_or_else(|| {
        actix_web::error::ErrorInternalServerError("Session keys not configured")
    })?;

    // 3. Validate the token.
    AuthenticatedUser::from_token(token, keys.get_ref())
}
