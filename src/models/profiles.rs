use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

/// Marketplace role, fixed when the profile is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Role {
    #[sea_orm(string_value = "brand")]
    Brand,
    #[sea_orm(string_value = "tailor")]
    Tailor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KycStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// SeaORM entity for the `profiles` table. The profile itself lives in
/// `document`; `role` is duplicated so it can be queried.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub app_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,
    pub role: Role,
    #[sea_orm(column_type = "JsonBinary")]
    pub document: Json,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── Domain ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCardItem {
    pub skill: String,
    pub base_rate: u32,
}

/// A user's profile: shared identity plus role-specific details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(flatten)]
    pub details: RoleDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum RoleDetails {
    Brand(BrandDetails),
    Tailor(TailorDetails),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDetails {
    pub brand_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorDetails {
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub rate_card: Vec<RateCardItem>,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default = "default_rating")]
    pub rating: f32,
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    #[serde(default)]
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub total_earnings: i64,
    #[serde(default)]
    pub jobs_completed: u32,
}

fn default_rating() -> f32 {
    5.0
}

impl Default for TailorDetails {
    fn default() -> Self {
        Self {
            specialties: Vec::new(),
            rate_card: Vec::new(),
            experience_years: 0,
            rating: default_rating(),
            portfolio_images: Vec::new(),
            kyc_status: KycStatus::Pending,
            total_earnings: 0,
            jobs_completed: 0,
        }
    }
}

impl TailorDetails {
    /// Selects or deselects a specialty, adding a zero-rate entry or dropping
    /// the existing one together with it.
    pub fn toggle_specialty(&mut self, skill: &str) {
        let skill = skill.trim();
        if skill.is_empty() {
            return;
        }
        if let Some(pos) = self.specialties.iter().position(|s| s == skill) {
            self.specialties.remove(pos);
            self.rate_card.retain(|r| r.skill != skill);
        } else {
            self.specialties.push(skill.to_string());
            self.rate_card.push(RateCardItem {
                skill: skill.to_string(),
                base_rate: 0,
            });
        }
    }

    pub fn set_rate(&mut self, skill: &str, base_rate: u32) -> MarketResult<()> {
        let entry = self
            .rate_card
            .iter_mut()
            .find(|r| r.skill == skill)
            .ok_or_else(|| {
                MarketError::validation(format!("'{skill}' is not one of the selected specialties"))
            })?;
        entry.base_rate = base_rate;
        Ok(())
    }

    /// Replaces the specialty set. Rates of retained skills survive; new skills
    /// start at zero.
    pub fn set_specialties(&mut self, specialties: &[String]) {
        let mut next: Vec<String> = Vec::with_capacity(specialties.len());
        for skill in specialties.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !next.iter().any(|s| s == skill) {
                next.push(skill.to_string());
            }
        }

        let rate_card = next
            .iter()
            .map(|skill| {
                self.rate_card
                    .iter()
                    .find(|r| &r.skill == skill)
                    .cloned()
                    .unwrap_or_else(|| RateCardItem {
                        skill: skill.clone(),
                        base_rate: 0,
                    })
            })
            .collect();

        self.specialties = next;
        self.rate_card = rate_card;
    }

    /// Appends an image unless it is already in the portfolio.
    pub fn add_portfolio_image(&mut self, url: &str) {
        if !self.portfolio_images.iter().any(|u| u == url) {
            self.portfolio_images.push(url.to_string());
        }
    }
}

impl UserProfile {
    pub fn role(&self) -> Role {
        match self.details {
            RoleDetails::Brand(_) => Role::Brand,
            RoleDetails::Tailor(_) => Role::Tailor,
        }
    }

    pub fn tailor(&self) -> Option<&TailorDetails> {
        match &self.details {
            RoleDetails::Tailor(t) => Some(t),
            RoleDetails::Brand(_) => None,
        }
    }

    /// Name shown on jobs posted by this profile.
    pub fn brand_name(&self) -> &str {
        match &self.details {
            RoleDetails::Brand(b) if !b.brand_name.is_empty() => &b.brand_name,
            _ => &self.display_name,
        }
    }

    /// Creates a profile from a patch. Role, email and display name are required.
    pub fn from_patch(uid: &str, patch: &ProfilePatch) -> MarketResult<Self> {
        let role = patch
            .role
            .ok_or_else(|| MarketError::validation("role is required to create a profile"))?;
        let email = patch
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| MarketError::validation("email is required to create a profile"))?;
        let display_name = patch
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| MarketError::validation("display name is required"))?;

        let details = match role {
            Role::Brand => RoleDetails::Brand(BrandDetails {
                brand_name: display_name.clone(),
            }),
            Role::Tailor => RoleDetails::Tailor(TailorDetails::default()),
        };

        let base = Self {
            uid: uid.to_string(),
            email,
            display_name,
            profile_image: None,
            details,
        };
        base.merged(patch)
    }

    /// Returns a copy with every field present in `patch` applied. Fields the
    /// patch leaves out are untouched.
    pub fn merged(&self, patch: &ProfilePatch) -> MarketResult<Self> {
        if let Some(role) = patch.role {
            if role != self.role() {
                return Err(MarketError::validation("role is immutable once a profile exists"));
            }
        }

        let mut next = self.clone();
        if let Some(email) = &patch.email {
            next.email = email.clone();
        }
        if let Some(name) = &patch.display_name {
            if name.trim().is_empty() {
                return Err(MarketError::validation("display name cannot be empty"));
            }
            next.display_name = name.clone();
        }
        if let Some(image) = &patch.profile_image {
            next.profile_image = Some(image.clone());
        }

        match &mut next.details {
            RoleDetails::Brand(brand) => {
                if patch.touches_tailor_fields() {
                    return Err(MarketError::validation(
                        "tailor-only fields cannot be set on a brand profile",
                    ));
                }
                if let Some(brand_name) = &patch.brand_name {
                    brand.brand_name = brand_name.clone();
                }
            }
            RoleDetails::Tailor(tailor) => {
                if patch.brand_name.is_some() {
                    return Err(MarketError::validation(
                        "brand name cannot be set on a tailor profile",
                    ));
                }
                apply_tailor_patch(tailor, patch)?;
            }
        }

        Ok(next)
    }
}

/// Merges into `existing`, or creates a profile when there is none yet.
pub fn merge_or_create(
    uid: &str,
    existing: Option<&UserProfile>,
    patch: &ProfilePatch,
) -> MarketResult<UserProfile> {
    match existing {
        Some(profile) => profile.merged(patch),
        None => UserProfile::from_patch(uid, patch),
    }
}

fn apply_tailor_patch(tailor: &mut TailorDetails, patch: &ProfilePatch) -> MarketResult<()> {
    if let Some(specialties) = &patch.specialties {
        tailor.set_specialties(specialties);
    }
    if let Some(rates) = &patch.rate_card {
        for item in rates {
            tailor.set_rate(&item.skill, item.base_rate)?;
        }
    }
    if let Some(years) = patch.experience_years {
        tailor.experience_years = years;
    }
    if let Some(rating) = patch.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(MarketError::validation("rating must be between 0.0 and 5.0"));
        }
        tailor.rating = rating;
    }
    if let Some(images) = &patch.portfolio_images {
        tailor.portfolio_images.clear();
        for url in images {
            tailor.add_portfolio_image(url);
        }
    }
    if let Some(url) = &patch.add_portfolio_image {
        tailor.add_portfolio_image(url);
    }
    if let Some(kyc) = patch.kyc_status {
        tailor.kyc_status = kyc;
    }
    if let Some(earnings) = patch.total_earnings {
        tailor.total_earnings = earnings;
    }
    if let Some(completed) = patch.jobs_completed {
        tailor.jobs_completed = completed;
    }
    Ok(())
}

// ── DTOs ──

/// Merge payload for profile writes. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub role: Option<Role>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub profile_image: Option<String>,
    pub brand_name: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub rate_card: Option<Vec<RateCardItem>>,
    pub experience_years: Option<u32>,
    pub rating: Option<f32>,
    pub portfolio_images: Option<Vec<String>>,
    pub add_portfolio_image: Option<String>,
    pub kyc_status: Option<KycStatus>,
    pub total_earnings: Option<i64>,
    pub jobs_completed: Option<u32>,
}

/// The edits a user may make to their own profile. KYC status, rating,
/// earnings, completed jobs, email and role are system-owned and rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileEdit {
    pub display_name: Option<String>,
    pub profile_image: Option<String>,
    pub brand_name: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub rate_card: Option<Vec<RateCardItem>>,
    pub experience_years: Option<u32>,
    pub portfolio_images: Option<Vec<String>>,
}

impl From<&ProfileEdit> for ProfilePatch {
    fn from(edit: &ProfileEdit) -> Self {
        Self {
            display_name: edit.display_name.clone(),
            profile_image: edit.profile_image.clone(),
            brand_name: edit.brand_name.clone(),
            specialties: edit.specialties.clone(),
            rate_card: edit.rate_card.clone(),
            experience_years: edit.experience_years,
            portfolio_images: edit.portfolio_images.clone(),
            ..Self::default()
        }
    }
}

impl ProfilePatch {
    fn touches_tailor_fields(&self) -> bool {
        self.specialties.is_some()
            || self.rate_card.is_some()
            || self.experience_years.is_some()
            || self.rating.is_some()
            || self.portfolio_images.is_some()
            || self.add_portfolio_image.is_some()
            || self.kyc_status.is_some()
            || self.total_earnings.is_some()
            || self.jobs_completed.is_some()
    }

    /// The patch that recreates `profile` in full.
    pub fn from_profile(profile: &UserProfile) -> Self {
        let mut patch = Self {
            role: Some(profile.role()),
            email: Some(profile.email.clone()),
            display_name: Some(profile.display_name.clone()),
            profile_image: profile.profile_image.clone(),
            ..Self::default()
        };
        match &profile.details {
            RoleDetails::Brand(b) => patch.brand_name = Some(b.brand_name.clone()),
            RoleDetails::Tailor(t) => {
                patch.specialties = Some(t.specialties.clone());
                patch.rate_card = Some(t.rate_card.clone());
                patch.experience_years = Some(t.experience_years);
                patch.rating = Some(t.rating);
                patch.portfolio_images = Some(t.portfolio_images.clone());
                patch.kyc_status = Some(t.kyc_status);
                patch.total_earnings = Some(t.total_earnings);
                patch.jobs_completed = Some(t.jobs_completed);
            }
        }
        patch
    }
}
