///! Integration tests for the data store: mode selection, the one-way
///! fallback to mock mode, and profile reads and writes.
///!
///! The remote backend is an in-memory fake that can be switched to failing,
///! so no database is needed.
///!
///! Run with: `cargo test --test store_test`
mod common;

use chrono::NaiveDate;
use std::sync::Arc;

use stitch_cloud::config::{AppConfig, BackendConfig, PLACEHOLDER_DATABASE_URL};
use stitch_cloud::error::MarketError;
use stitch_cloud::models::jobs::{EscrowStatus, JobFilter, JobPatch, JobStatus, NewJob, Sizing};
use stitch_cloud::models::profiles::{ProfileEdit, ProfilePatch, Role};
use stitch_cloud::store::{DataStore, StoreMode};

use common::{InMemoryBackend, mock_store, profile_service, remote_store};

fn new_job(brand_id: &str) -> NewJob {
    NewJob {
        brand_id: brand_id.to_string(),
        brand_name: "Test Brand".to_string(),
        garment_type: "Polos".to_string(),
        sizing: Sizing::new(2, 2, 2, 2),
        fabric_type: "Pique".to_string(),
        deadline: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        budget: 640,
        design_files: Vec::new(),
    }
}

fn brand_patch(name: &str) -> ProfilePatch {
    ProfilePatch {
        role: Some(Role::Brand),
        email: Some("owner@brand.test".to_string()),
        display_name: Some(name.to_string()),
        brand_name: Some(name.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_missing_backend_config_starts_in_mock_mode() {
    let store = DataStore::connect(&AppConfig::default()).await;

    assert_eq!(store.mode(), StoreMode::Mock);
    assert_eq!(store.list_jobs(&JobFilter::all()).await.len(), 3);
}

#[tokio::test]
async fn test_placeholder_backend_config_starts_in_mock_mode() {
    let config = AppConfig {
        backend: Some(BackendConfig {
            database_url: PLACEHOLDER_DATABASE_URL.to_string(),
        }),
        ..AppConfig::default()
    };

    let store = DataStore::connect(&config).await;

    assert_eq!(store.mode(), StoreMode::Mock);
}

#[tokio::test]
async fn test_seed_data_spans_all_statuses() {
    let jobs = mock_store().list_jobs(&JobFilter::all()).await;

    let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["job-preload-1", "job-preload-2", "job-preload-3"]);
    assert_eq!(jobs[1].quantity, 50);
    assert_eq!(jobs[0].status, JobStatus::PendingMatch);
    assert_eq!(jobs[1].status, JobStatus::InProduction);
    assert_eq!(jobs[1].escrow_status, EscrowStatus::Held);
    assert_eq!(jobs[2].status, JobStatus::Completed);
}

#[tokio::test]
async fn test_remote_mode_writes_go_to_the_backend() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = remote_store(backend.clone());

    let job = store.create_job(new_job("brand-r")).await;

    assert_eq!(store.mode(), StoreMode::Remote);
    let stored = backend.stored_jobs().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, job.id);
    assert_eq!(store.list_jobs(&JobFilter::all()).await, stored);
}

#[tokio::test]
async fn test_transport_failure_switches_to_mock_for_good() {
    let backend = Arc::new(InMemoryBackend::failing());
    let store = remote_store(backend.clone());
    let mut modes = store.mode_events();

    // The failing call is answered from the mock store instead of erroring.
    let jobs = store.list_jobs(&JobFilter::all()).await;
    assert_eq!(jobs.len(), 3);
    assert_eq!(store.mode(), StoreMode::Mock);
    assert!(modes.has_changed().unwrap());
    assert_eq!(*modes.borrow_and_update(), StoreMode::Mock);

    // Later operations never touch the backend again.
    let calls = backend.calls();
    let job = store.create_job(new_job("brand-x")).await;
    assert_eq!(store.get_job(&job.id).await, Some(job.clone()));
    store
        .update_job(&job.id, &JobPatch { status: Some(JobStatus::InProduction), ..Default::default() })
        .await
        .expect("job exists in the mock store");
    assert!(store.read_profile("nobody").await.is_none());
    assert_eq!(backend.calls(), calls);
    assert!(!modes.has_changed().unwrap());
}

#[tokio::test]
async fn test_failure_mid_session_serves_writes_from_mock() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = remote_store(backend.clone());
    store.create_job(new_job("brand-a")).await;

    backend.fail_from_now();
    let job = store.create_job(new_job("brand-b")).await;

    assert_eq!(store.mode(), StoreMode::Mock);
    assert_eq!(job.status, JobStatus::PendingMatch);
    // Mock mode has its own seeded data; the new job is there too.
    let listed = store.list_jobs(&JobFilter::brand("brand-b")).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, job.id);
}

#[tokio::test]
async fn test_failed_profile_write_still_returns_merged_profile() {
    let backend = Arc::new(InMemoryBackend::failing());
    let store = remote_store(backend);

    let profile = store.write_profile("uid-1", &brand_patch("Acme")).await.unwrap();

    assert_eq!(profile.brand_name(), "Acme");
    assert_eq!(store.mode(), StoreMode::Mock);
    assert_eq!(store.read_profile("uid-1").await, Some(profile));
}

#[tokio::test]
async fn test_write_then_read_profile_round_trips() {
    let backend = Arc::new(InMemoryBackend::new());
    let store = remote_store(backend);

    let written = store.write_profile("uid-7", &brand_patch("Threadbare")).await.unwrap();
    let read = store.read_profile("uid-7").await.expect("profile was written");

    assert_eq!(read, written);
    assert_eq!(read.role(), Role::Brand);
    assert_eq!(read.email, "owner@brand.test");
    assert_eq!(store.mode(), StoreMode::Remote);
}

#[tokio::test]
async fn test_profile_creation_requires_role_and_name() {
    let store = mock_store();

    let no_role = ProfilePatch {
        email: Some("a@b.test".to_string()),
        display_name: Some("A".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        store.write_profile("uid-2", &no_role).await,
        Err(MarketError::Validation(_))
    ));

    let no_name = ProfilePatch {
        display_name: None,
        ..brand_patch("x")
    };
    assert!(matches!(
        store.write_profile("uid-2", &no_name).await,
        Err(MarketError::Validation(_))
    ));
    assert!(store.read_profile("uid-2").await.is_none());
}

#[tokio::test]
async fn test_role_is_immutable() {
    let store = mock_store();
    store.write_profile("uid-3", &brand_patch("Acme")).await.unwrap();

    let switch = ProfilePatch {
        role: Some(Role::Tailor),
        ..Default::default()
    };
    let err = store.write_profile("uid-3", &switch).await.unwrap_err();

    assert!(matches!(err, MarketError::Validation(_)));
    assert_eq!(store.read_profile("uid-3").await.unwrap().role(), Role::Brand);
}

#[tokio::test]
async fn test_update_profile_is_idempotent() {
    let store = mock_store();
    let profiles = profile_service(&store);
    store.write_profile("uid-4", &brand_patch("Acme")).await.unwrap();

    let patch = ProfileEdit {
        profile_image: Some("https://img.test/a.png".to_string()),
        brand_name: Some("Acme Apparel".to_string()),
        ..Default::default()
    };
    let once = profiles.update_profile("uid-4", &patch).await.unwrap();
    let twice = profiles.update_profile("uid-4", &patch).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.brand_name(), "Acme Apparel");
}

#[tokio::test]
async fn test_update_profile_never_creates() {
    let profiles = profile_service(&mock_store());

    let edit = ProfileEdit {
        brand_name: Some("Ghost".to_string()),
        ..Default::default()
    };
    let err = profiles.update_profile("ghost", &edit).await.unwrap_err();

    assert!(matches!(err, MarketError::NotFound { .. }));
}

#[tokio::test]
async fn test_profile_wire_format_has_role_tag() {
    let store = mock_store();
    let profile = store.write_profile("uid-5", &brand_patch("Acme")).await.unwrap();

    let json = serde_json::to_value(&profile).unwrap();

    assert_eq!(json["role"], "Brand");
    assert_eq!(json["brandName"], "Acme");
    assert_eq!(json["displayName"], "Acme");
    assert_eq!(json["uid"], "uid-5");
}
