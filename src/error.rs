use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

/// Errors a caller can act on. Infrastructure failures never end up here; the
/// store absorbs them by switching to mock mode.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl MarketError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn job_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "Job",
            id: id.to_string(),
        }
    }

    pub fn profile_not_found(uid: &str) -> Self {
        Self::NotFound {
            entity: "Profile",
            id: uid.to_string(),
        }
    }
}

impl ResponseError for MarketError {
    fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
            MarketError::Conflict(_) => StatusCode::CONFLICT,
            MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
            MarketError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;

/// Infrastructure failures: missing configuration or a failing remote call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        StoreError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}
