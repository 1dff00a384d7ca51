//! Stand-ins for payments, identity checks, uploads and matching. They return
//! canned or randomized data after an artificial delay.

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::debug;

use crate::models::recommendations::TailorRecommendation;

pub const MOCK_AVATARS: [&str; 5] = [
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?auto=format&fit=crop&w=300&q=80",
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&w=300&q=80",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?auto=format&fit=crop&w=300&q=80",
    "https://images.unsplash.com/photo-1534528741775-53994a69daeb?auto=format&fit=crop&w=300&q=80",
    "https://images.unsplash.com/photo-1539571696357-5a69c17a67c6?auto=format&fit=crop&w=300&q=80",
];

pub const MOCK_PORTFOLIO: [&str; 6] = [
    "https://images.unsplash.com/photo-1593030761757-71bd90dbe78db?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1594938298603-c8148c4dae35?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1598554747436-c9293d6a70b4?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1489987707025-afc232f7ea0f?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1556905055-8f358a7a47b2?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1558769132-cb1aea458c5e?auto=format&fit=crop&w=800&q=80",
];

/// Sleeps for `delay`, skipping the timer entirely when it is zero.
pub async fn latency(delay: Duration, what: &str) {
    if delay.is_zero() {
        return;
    }
    debug!(what, delay_ms = delay.as_millis() as u64, "Simulating latency");
    tokio::time::sleep(delay).await;
}

pub fn pick<'a>(items: &[&'a str]) -> &'a str {
    items
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
}

/// URL of a freshly "uploaded" profile picture.
pub fn upload_avatar() -> String {
    pick(&MOCK_AVATARS).to_string()
}

/// URL of a freshly "uploaded" portfolio shot.
pub fn upload_portfolio_image() -> String {
    pick(&MOCK_PORTFOLIO).to_string()
}

/// File name recorded for a portfolio upload during onboarding.
pub fn onboarding_portfolio_file() -> String {
    format!("img_{}.jpg", Utc::now().timestamp_millis())
}

/// File names for one batch of uploaded design documents.
pub fn design_file_names() -> Vec<String> {
    vec![
        format!("Design_Spec_{}.pdf", Utc::now().timestamp_millis()),
        format!("Pattern_v{}.ai", rand::thread_rng().gen_range(0..5)),
    ]
}

/// The fixed shortlist offered for every garment type.
pub fn recommended_tailors() -> Vec<TailorRecommendation> {
    let tags = |t: &[&str]| t.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        TailorRecommendation {
            uid: "tailor-1".to_string(),
            display_name: "Elena \"The Needle\" Rossi".to_string(),
            rating: 4.9,
            match_score: 98,
            estimated_quote: 1200,
            specialties: tags(&["Haute Couture", "Silk", "Evening Wear"]),
        },
        TailorRecommendation {
            uid: "tailor-2".to_string(),
            display_name: "Urban Stitch Co.".to_string(),
            rating: 4.7,
            match_score: 92,
            estimated_quote: 950,
            specialties: tags(&["Denim", "Streetwear", "Heavy Canvas"]),
        },
        TailorRecommendation {
            uid: "tailor-3".to_string(),
            display_name: "Master Tailor Kim".to_string(),
            rating: 5.0,
            match_score: 89,
            estimated_quote: 1450,
            specialties: tags(&["Suits", "Wool", "Tailoring"]),
        },
    ]
}
