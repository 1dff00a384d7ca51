pub mod jobs;
pub mod onboarding;
pub mod profiles;
pub mod simulated;

pub use jobs::JobService;
pub use onboarding::{OnboardingDrafts, TailorOnboarding};
pub use profiles::ProfileService;
