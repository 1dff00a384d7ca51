///! Integration test for session tokens, one-time codes and identity fallback.
///!
///! Tokens are minted locally with the same HS256 secret the server would
///! use, then validated through `validate_token`. No running server,
///! identity provider or database is needed.
///!
///! Run with: `cargo test --test auth_test`
mod common;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::sync::Arc;
use std::time::Duration;

use stitch_cloud::auth::authorization::{require_role, verify_job_owner};
use stitch_cloud::auth::identity::{DEV_EMAIL, IdentityProvider, IdentitySource, local_uid};
use stitch_cloud::auth::jwt::{Claims, SessionKeys, mint_token, validate_token};
use stitch_cloud::auth::otp::OtpIssuer;
use stitch_cloud::config::{AppConfig, IdentityConfig, OtpConfig};
use stitch_cloud::error::MarketError;
use stitch_cloud::models::profiles::Role;
use stitch_cloud::store::StoreMode;
use stitch_cloud::store::mock::MOCK_DEV_UID;

use common::{InMemoryBackend, job_service, mock_store, profile_service, remote_store};

/// Throwaway HS256 secret, only ever used by these tests.
const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

#[test]
fn test_valid_token_decodes_correctly() {
    let claims = Claims::new("local-alice", "alice@example.com", Duration::from_secs(3600));
    let token = mint_token(&claims, TEST_SECRET).expect("Failed to mint test token");

    let decoded = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(decoded.sub, "local-alice");
    assert_eq!(decoded.email, "alice@example.com");
    assert_eq!(decoded.exp, decoded.iat + 3600);
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: "local-expired".to_string(),
        email: "expired@example.com".to_string(),
        exp: now - 300, // expired 5 minutes ago (well past the 60s default leeway)
        iat: now - 3600,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let result = validate_token(&token, TEST_SECRET);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("ExpiredSignature"));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let keys = SessionKeys::new(TEST_SECRET, Duration::from_secs(60));
    let token = keys.mint("local-bob", "bob@example.com").unwrap();

    let result = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("InvalidSignature"));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_token("not.a.valid.jwt", TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn test_session_keys_round_trip() {
    let keys = SessionKeys::new(TEST_SECRET, Duration::from_secs(60));

    let token = keys.mint("uid-1", "one@example.com").unwrap();
    let claims = keys.validate(&token).unwrap();

    assert_eq!(claims.sub, "uid-1");
    assert_eq!(claims.email, "one@example.com");
}

#[test]
fn test_local_uids_are_stable_per_email() {
    assert_eq!(local_uid("Alice@Example.com"), local_uid(" alice@example.com "));
    assert_ne!(local_uid("alice@example.com"), local_uid("bob@example.com"));
    assert!(local_uid("alice@example.com").starts_with("local-"));
    assert_eq!(local_uid(DEV_EMAIL), MOCK_DEV_UID);
}

#[test]
fn test_local_uids_keep_punctuation_apart() {
    let dotted = local_uid("a.b@x.com");
    let dashed = local_uid("a-b@x.com");
    let underscored = local_uid("a_b@x.com");

    assert_ne!(dotted, dashed);
    assert_ne!(dotted, underscored);
    assert_ne!(dashed, underscored);
}

#[tokio::test]
async fn test_otp_accepts_the_issued_code_once() {
    let otp = OtpIssuer::new(&OtpConfig::default());

    let notification = otp.issue("Carol@Example.com").await.unwrap();
    assert_eq!(notification.email, "carol@example.com");
    assert!(notification.message.contains("123456"));

    let email = otp.verify("carol@example.com", "123456").await.unwrap();
    assert_eq!(email, "carol@example.com");

    // Codes are single use.
    let reused = otp.verify("carol@example.com", "123456").await;
    assert!(matches!(reused, Err(MarketError::Validation(_))));
}

#[tokio::test]
async fn test_otp_rejects_wrong_code_and_bad_email() {
    let otp = OtpIssuer::new(&OtpConfig::default());
    otp.issue("dave@example.com").await.unwrap();

    assert!(matches!(
        otp.verify("dave@example.com", "000000").await,
        Err(MarketError::Validation(_))
    ));
    assert!(matches!(otp.issue("not-an-email").await, Err(MarketError::Validation(_))));
    assert!(matches!(
        otp.verify("never@example.com", "123456").await,
        Err(MarketError::Validation(_))
    ));
}

#[tokio::test]
async fn test_mock_mode_uses_local_identity() {
    let provider = IdentityProvider::new(&AppConfig::default(), mock_store());

    let identity = provider.authenticate(DEV_EMAIL).await;

    assert_eq!(identity.uid, MOCK_DEV_UID);
    assert_eq!(identity.source, IdentitySource::Local);
}

#[tokio::test]
async fn test_no_initial_token_means_anonymous_identity() {
    let store = remote_store(Arc::new(InMemoryBackend::new()));
    let provider = IdentityProvider::new(&AppConfig::default(), store.clone());

    let identity = provider.authenticate("erin@example.com").await;

    assert_eq!(identity.source, IdentitySource::Anonymous);
    assert_eq!(identity.uid, local_uid("erin@example.com"));
    assert_eq!(store.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn test_failed_identity_exchange_degrades_the_store() {
    let store = remote_store(Arc::new(InMemoryBackend::new()));
    let config = AppConfig {
        initial_auth_token: Some("not.a.valid.jwt".to_string()),
        identity: Some(IdentityConfig {
            jwks_url: "http://127.0.0.1:9/jwks.json".to_string(),
            api_key: None,
        }),
        ..AppConfig::default()
    };
    let provider = IdentityProvider::new(&config, store.clone());

    let identity = provider.authenticate("frank@example.com").await;

    assert_eq!(identity.source, IdentitySource::Local);
    assert_eq!(identity.uid, local_uid("frank@example.com"));
    assert_eq!(store.mode(), StoreMode::Mock);
}

#[tokio::test]
async fn test_require_role_forbids_the_other_role() {
    let profiles = profile_service(&mock_store());
    profiles
        .onboard_brand("brand-uid", "hello@acme.test", "Acme")
        .await
        .unwrap();

    let brand = require_role(&profiles, "brand-uid", Role::Brand).await.unwrap();
    assert_eq!(brand.brand_name(), "Acme");

    // A brand may not accept jobs.
    assert!(matches!(
        require_role(&profiles, "brand-uid", Role::Tailor).await,
        Err(MarketError::Forbidden(_))
    ));
    // Not onboarded yet.
    assert!(matches!(
        require_role(&profiles, "nobody", Role::Brand).await,
        Err(MarketError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_only_the_posting_brand_owns_a_job() {
    let jobs = job_service(&mock_store());
    let job = jobs.get_job("job-preload-1").await.unwrap();

    assert!(verify_job_owner(&job, &job.brand_id).is_ok());
    assert!(matches!(
        verify_job_owner(&job, "brand-2"),
        Err(MarketError::Forbidden(_))
    ));
}
