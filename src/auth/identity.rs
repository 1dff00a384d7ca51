use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwks::JwksCache;
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::store::mock::MOCK_DEV_UID;
use crate::store::{DataStore, StoreMode};

/// Email of the built-in demo account, which owns the seeded job history.
pub const DEV_EMAIL: &str = "dev@stitch.cloud";

/// Namespace for name-based local uids.
const LOCAL_UID_NAMESPACE: Uuid = Uuid::from_u128(0x5a1e_c7d2_4b3f_4e6a_9c1d_2f8b_7e05_a913);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    /// The pre-issued identity token was verified.
    Token,
    /// No token configured; the backend accepts anonymous users.
    Anonymous,
    /// Mock mode, or the identity exchange failed.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub source: IdentitySource,
}

/// Resolves the uid for a user who just proved their email.
pub struct IdentityProvider {
    store: Arc<DataStore>,
    initial_token: Option<String>,
    jwks: Option<JwksCache>,
}

impl IdentityProvider {
    pub fn new(config: &AppConfig, store: Arc<DataStore>) -> Self {
        let jwks = config
            .identity
            .as_ref()
            .map(|id| JwksCache::new(&id.jwks_url, id.api_key.as_deref()));

        Self {
            store,
            initial_token: config.initial_auth_token.clone(),
            jwks,
        }
    }

    /// Never fails: whatever goes wrong, the caller gets the local identity and
    /// the store drops to mock mode.
    pub async fn authenticate(&self, email: &str) -> Identity {
        if self.store.mode() == StoreMode::Mock {
            return local_identity(email, IdentitySource::Local);
        }

        let Some(token) = &self.initial_token else {
            return local_identity(email, IdentitySource::Anonymous);
        };

        let Some(jwks) = &self.jwks else {
            self.store.degrade(
                "authenticate",
                &StoreError::Configuration(
                    "identity token present but no key set configured".to_string(),
                ),
            );
            return local_identity(email, IdentitySource::Local);
        };

        match jwks.validate_token(token).await {
            Ok(claims) => {
                info!(uid = %claims.sub, "Identity token accepted");
                Identity {
                    uid: claims.sub,
                    email: claims.email.unwrap_or_else(|| email.to_string()),
                    source: IdentitySource::Token,
                }
            }
            Err(e) => {
                warn!(error = %e, "Identity exchange failed, using local identity");
                self.store.degrade("authenticate", &StoreError::Transport(e));
                local_identity(email, IdentitySource::Local)
            }
        }
    }
}

fn local_identity(email: &str, source: IdentitySource) -> Identity {
    Identity {
        uid: local_uid(email),
        email: email.to_string(),
        source,
    }
}

/// Stable uid for an email when no identity provider vouches for it. Distinct
/// normalized emails always get distinct uids.
pub fn local_uid(email: &str) -> String {
    let email = email.trim().to_lowercase();
    if email == DEV_EMAIL {
        return MOCK_DEV_UID.to_string();
    }

    let id = Uuid::new_v5(&LOCAL_UID_NAMESPACE, email.as_bytes());
    format!("local-{}", id.simple())
}
