use serde::{Deserialize, Serialize};

/// A candidate tailor for an order. Produced per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRecommendation {
    pub uid: String,
    pub display_name: String,
    pub rating: f32,
    /// 0–100.
    pub match_score: u8,
    pub estimated_quote: i64,
    pub specialties: Vec<String>,
}
