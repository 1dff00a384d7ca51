pub mod auth;
pub mod feed;
pub mod jobs;
pub mod onboarding;
pub mod profile;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (otp + verify are public; /me requires a session) ──
    cfg.service(
        web::scope("/auth")
            .route("/otp", web::post().to(auth::request_otp))
            .route("/verify", web::post().to(auth::verify_otp))
            .route("/me", web::get().to(auth::me)),
    );

    // ── Onboarding routes (all protected) ──
    cfg.service(
        web::scope("/onboarding")
            .route("/brand", web::post().to(onboarding::onboard_brand))
            .route("/tailor", web::get().to(onboarding::tailor_draft))
            .route("/tailor/basic", web::put().to(onboarding::tailor_basic_info))
            .route(
                "/tailor/specialties/{skill}",
                web::post().to(onboarding::tailor_toggle_specialty),
            )
            .route("/tailor/rates", web::put().to(onboarding::tailor_set_rates))
            .route("/tailor/portfolio", web::post().to(onboarding::tailor_upload_portfolio))
            .route("/tailor/kyc", web::post().to(onboarding::tailor_verify_identity))
            .route("/tailor/submit", web::post().to(onboarding::tailor_submit)),
    );

    // ── Profile routes (all protected) ──
    cfg.service(
        web::scope("/profile")
            .route("", web::patch().to(profile::update_profile))
            .route("/image", web::post().to(profile::upload_image))
            .route("/portfolio", web::post().to(profile::add_portfolio_image)),
    );

    // ── Job routes (all protected; the feed authenticates via ?token=) ──
    // Fixed paths go before /{id} so they aren't captured by it.
    cfg.service(
        web::scope("/jobs")
            .route("", web::get().to(jobs::list_jobs))
            .route("", web::post().to(jobs::create_job))
            .route("/ws", web::get().to(feed::ws_connect))
            .route("/board", web::get().to(jobs::tailor_board))
            .route("/summary", web::get().to(jobs::brand_summary))
            .route("/design-files", web::post().to(jobs::upload_design_files))
            .route("/{id}", web::get().to(jobs::get_job))
            .route("/{id}/accept", web::post().to(jobs::accept_job))
            .route("/{id}/escrow", web::post().to(jobs::fund_escrow))
            .route("/{id}/recommendations", web::get().to(jobs::recommendations)),
    );
}
