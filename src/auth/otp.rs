use moka::future::Cache;
use serde::Serialize;
use tracing::info;

use crate::config::OtpConfig;
use crate::error::{MarketError, MarketResult};

/// What the client is told after requesting a code. There is no real delivery
/// channel, so the code itself is part of the message.
#[derive(Debug, Clone, Serialize)]
pub struct OtpNotification {
    pub email: String,
    pub message: String,
}

/// Issues and checks simulated one-time codes, one pending code per email.
#[derive(Clone)]
pub struct OtpIssuer {
    codes: Cache<String, String>,
    code: String,
}

impl OtpIssuer {
    pub fn new(config: &OtpConfig) -> Self {
        let codes = Cache::builder()
            .time_to_live(config.ttl)
            .max_capacity(10_000)
            .build();

        Self {
            codes,
            code: config.demo_code.clone(),
        }
    }

    pub async fn issue(&self, email: &str) -> MarketResult<OtpNotification> {
        let email = normalize_email(email)?;
        self.codes.insert(email.clone(), self.code.clone()).await;
        info!(email = %email, code = %self.code, "Simulated one-time code issued");

        Ok(OtpNotification {
            message: format!("Simulated Code: {}", self.code),
            email,
        })
    }

    /// Consumes the pending code for `email` if `code` matches it.
    pub async fn verify(&self, email: &str, code: &str) -> MarketResult<String> {
        let email = normalize_email(email)?;
        match self.codes.get(&email).await {
            Some(expected) if expected == code.trim() => {
                self.codes.invalidate(&email).await;
                Ok(email)
            }
            Some(_) => Err(MarketError::validation(format!(
                "Invalid code. Try {}",
                self.code
            ))),
            None => Err(MarketError::validation(
                "no code pending for this email; request a new one",
            )),
        }
    }
}

fn normalize_email(email: &str) -> MarketResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(MarketError::validation("a valid email address is required"));
    }
    Ok(email)
}
