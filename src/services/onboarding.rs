use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{MarketError, MarketResult};
use crate::models::profiles::{KycStatus, RoleDetails, TailorDetails, UserProfile};
use crate::services::simulated;

/// Draft state of the four-step tailor sign-up: basic info, specialties and
/// rates, portfolio, identity check. Steps can be revisited in any order;
/// only [`TailorOnboarding::into_profile`] enforces completeness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorOnboarding {
    pub display_name: String,
    #[serde(flatten)]
    pub draft: TailorDetails,
}

impl TailorOnboarding {
    pub fn basic_info(&mut self, display_name: &str, experience_years: Option<u32>) {
        self.display_name = display_name.trim().to_string();
        if let Some(years) = experience_years {
            self.draft.experience_years = years;
        }
    }

    pub fn toggle_specialty(&mut self, skill: &str) {
        self.draft.toggle_specialty(skill);
    }

    pub fn set_rate(&mut self, skill: &str, base_rate: u32) -> MarketResult<()> {
        self.draft.set_rate(skill, base_rate)
    }

    /// Records one more uploaded portfolio file and returns its name.
    pub fn upload_portfolio_file(&mut self) -> String {
        let file = simulated::onboarding_portfolio_file();
        self.draft.add_portfolio_image(&file);
        file
    }

    /// Runs the simulated identity check, which always passes.
    pub async fn verify_identity(&mut self, delay: Duration) {
        simulated::latency(delay, "identity verification").await;
        self.draft.kyc_status = KycStatus::Verified;
    }

    /// Final submission. Needs a display name and a verified identity.
    pub fn into_profile(self, uid: &str, email: &str) -> MarketResult<UserProfile> {
        if self.display_name.is_empty() {
            return Err(MarketError::validation("display name is required"));
        }
        if self.draft.kyc_status != KycStatus::Verified {
            return Err(MarketError::validation(
                "identity verification must be completed before submitting",
            ));
        }

        let details = TailorDetails {
            experience_years: self.draft.experience_years.max(1),
            rating: 5.0,
            total_earnings: 0,
            jobs_completed: 0,
            ..self.draft
        };

        Ok(UserProfile {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: self.display_name,
            profile_image: None,
            details: RoleDetails::Tailor(details),
        })
    }
}

/// Per-user wizard drafts, kept between step requests and dropped after a
/// period of inactivity.
#[derive(Clone)]
pub struct OnboardingDrafts {
    cache: Cache<String, TailorOnboarding>,
}

impl OnboardingDrafts {
    pub fn new(idle_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_idle(idle_ttl)
            .max_capacity(10_000)
            .build();
        Self { cache }
    }

    pub async fn load(&self, uid: &str) -> TailorOnboarding {
        self.cache.get(uid).await.unwrap_or_default()
    }

    pub async fn save(&self, uid: &str, draft: TailorOnboarding) {
        self.cache.insert(uid.to_string(), draft).await;
    }

    pub async fn discard(&self, uid: &str) {
        self.cache.invalidate(uid).await;
        debug!(uid, "Onboarding draft discarded");
    }
}

impl Default for OnboardingDrafts {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
