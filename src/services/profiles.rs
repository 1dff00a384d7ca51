use std::sync::Arc;
use tracing::info;

use crate::error::{MarketError, MarketResult};
use crate::models::profiles::{ProfileEdit, ProfilePatch, Role, UserProfile};
use crate::services::onboarding::TailorOnboarding;
use crate::services::simulated;
use crate::store::DataStore;

/// Creates profiles at the end of onboarding and merges later edits into them.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<DataStore>,
}

impl ProfileService {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, uid: &str) -> MarketResult<UserProfile> {
        self.store
            .read_profile(uid)
            .await
            .ok_or_else(|| MarketError::profile_not_found(uid))
    }

    pub async fn onboard_brand(&self, uid: &str, email: &str, name: &str) -> MarketResult<UserProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MarketError::validation("brand name is required"));
        }
        self.ensure_new(uid).await?;

        let patch = ProfilePatch {
            role: Some(Role::Brand),
            email: Some(email.to_string()),
            display_name: Some(name.to_string()),
            brand_name: Some(name.to_string()),
            ..Default::default()
        };
        let profile = self.store.write_profile(uid, &patch).await?;
        info!(uid, brand_name = name, "Brand onboarded");
        Ok(profile)
    }

    pub async fn onboard_tailor(
        &self,
        uid: &str,
        email: &str,
        wizard: TailorOnboarding,
    ) -> MarketResult<UserProfile> {
        let profile = wizard.into_profile(uid, email)?;
        self.ensure_new(uid).await?;

        let profile = self
            .store
            .write_profile(uid, &ProfilePatch::from_profile(&profile))
            .await?;
        info!(uid, display_name = %profile.display_name, "Tailor onboarded");
        Ok(profile)
    }

    /// Applies the user's own edits to an existing profile. Never creates one.
    pub async fn update_profile(&self, uid: &str, edit: &ProfileEdit) -> MarketResult<UserProfile> {
        self.merge_existing(uid, &ProfilePatch::from(edit)).await
    }

    /// Simulated avatar upload.
    pub async fn upload_profile_image(&self, uid: &str) -> MarketResult<UserProfile> {
        let patch = ProfilePatch {
            profile_image: Some(simulated::upload_avatar()),
            ..Default::default()
        };
        self.merge_existing(uid, &patch).await
    }

    /// Simulated portfolio upload. Tailors only.
    pub async fn add_portfolio_image(&self, uid: &str) -> MarketResult<UserProfile> {
        let profile = self.get_profile(uid).await?;
        if profile.role() != Role::Tailor {
            return Err(MarketError::Forbidden(
                "only tailors have a portfolio".to_string(),
            ));
        }

        let patch = ProfilePatch {
            add_portfolio_image: Some(simulated::upload_portfolio_image()),
            ..Default::default()
        };
        self.store.write_profile(uid, &patch).await
    }

    async fn merge_existing(&self, uid: &str, patch: &ProfilePatch) -> MarketResult<UserProfile> {
        if self.store.read_profile(uid).await.is_none() {
            return Err(MarketError::profile_not_found(uid));
        }
        self.store.write_profile(uid, patch).await
    }

    async fn ensure_new(&self, uid: &str) -> MarketResult<()> {
        match self.store.read_profile(uid).await {
            Some(_) => Err(MarketError::Conflict(format!(
                "user {uid} has already completed onboarding"
            ))),
            None => Ok(()),
        }
    }
}
