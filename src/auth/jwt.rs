use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session token claims.
///
/// Issued by `POST /api/auth/verify` once the one-time code checks out and
/// signed with HS256 using `SESSION_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's uid.
    pub sub: String,
    pub email: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: usize,
}

impl Claims {
    pub fn new(uid: &str, email: &str, ttl: Duration) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;
        Self {
            sub: uid.to_string(),
            email: email.to_string(),
            exp: now + ttl.as_secs() as usize,
            iat: now,
        }
    }
}

pub fn mint_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign session token: {e}"))
}

/// Validate a session token and return the decoded claims. The error names
/// the failure kind, e.g. `ExpiredSignature`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|td| td.claims)
    .map_err(|e| format!("{:?}", e.kind()))
}

/// Secret and lifetime of session tokens, shared through actix app data.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            secret: secret.to_string(),
            ttl,
        }
    }

    pub fn mint(&self, uid: &str, email: &str) -> Result<String, String> {
        mint_token(&Claims::new(uid, email, self.ttl), &self.secret)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, String> {
        validate_token(token, &self.secret)
    }
}
