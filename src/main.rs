use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use std::sync::Arc;
use stitch_cloud::auth::identity::IdentityProvider;
use stitch_cloud::auth::jwt::SessionKeys;
use stitch_cloud::auth::otp::OtpIssuer;
use stitch_cloud::handlers;
use stitch_cloud::services::{JobService, OnboardingDrafts, ProfileService};
use stitch_cloud::{AppConfig, DataStore};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env();

    // Falls back to mock mode on its own; never fails.
    let store = Arc::new(DataStore::connect(&config).await);

    let jobs = web::Data::new(JobService::new(store.clone(), config.delays.clone()));
    let profiles = web::Data::new(ProfileService::new(store.clone()));
    let identity = web::Data::new(IdentityProvider::new(&config, store.clone()));
    let otp = web::Data::new(OtpIssuer::new(&config.otp));
    let drafts = web::Data::new(OnboardingDrafts::default());
    let session_keys = web::Data::new(SessionKeys::new(&config.session_secret, config.session_ttl));
    let store_data = web::Data::from(store);
    let config_data = web::Data::new(config.clone());

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(app_id = %config.app_id, "Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(config_data.clone())
            .app_data(store_data.clone())
            .app_data(jobs.clone())
            .app_data(profiles.clone())
            .app_data(identity.clone())
            .app_data(otp.clone())
            .app_data(drafts.clone())
            .app_data(session_keys.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
