pub mod jobs;
pub mod profiles;
pub mod recommendations;
