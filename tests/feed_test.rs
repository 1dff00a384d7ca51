///! Integration tests for job-list subscriptions: manual, poll and push
///! triggers, plus unsubscribe semantics.
///!
///! Run with: `cargo test --test feed_test`
mod common;

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use stitch_cloud::feed::triggers::manual;
use stitch_cloud::models::jobs::{Job, JobFilter, NewJob, Sizing};
use stitch_cloud::store::DataStore;

use common::{APP_ID, InMemoryBackend, mock_store, remote_store};

const WAIT: Duration = Duration::from_secs(2);

fn new_job(brand_id: &str) -> NewJob {
    NewJob {
        brand_id: brand_id.to_string(),
        brand_name: "Feed Brand".to_string(),
        garment_type: "Scarves".to_string(),
        sizing: Sizing::new(0, 4, 0, 0),
        fabric_type: "Wool".to_string(),
        deadline: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        budget: 200,
        design_files: Vec::new(),
    }
}

fn channel_listener() -> (impl FnMut(Vec<Job>) + Send + 'static, mpsc::UnboundedReceiver<Vec<Job>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = move |jobs: Vec<Job>| {
        let _ = tx.send(jobs);
    };
    (listener, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Vec<Job>>) -> Vec<Job> {
    timeout(WAIT, rx.recv())
        .await
        .expect("delivery timed out")
        .expect("subscription ended")
}

#[tokio::test]
async fn test_manual_trigger_delivers_initial_and_refreshed_lists() {
    let store = mock_store();
    let (notifier, trigger) = manual();
    let (listener, mut rx) = channel_listener();

    let sub = store.subscribe_jobs_with(JobFilter::all(), Box::new(trigger), listener);

    let initial = next(&mut rx).await;
    assert_eq!(initial.len(), 3);

    let job = store.create_job(new_job("brand-m")).await;
    notifier.notify();

    let refreshed = next(&mut rx).await;
    assert_eq!(refreshed.len(), 4);
    assert_eq!(refreshed[0].id, job.id, "newest job comes first");
    assert!(sub.is_active());
}

#[tokio::test]
async fn test_filtered_subscription_only_sees_its_brand() {
    let store = mock_store();
    let (notifier, trigger) = manual();
    let (listener, mut rx) = channel_listener();

    let _sub = store.subscribe_jobs_with(JobFilter::brand("brand-2"), Box::new(trigger), listener);

    let initial = next(&mut rx).await;
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].id, "job-preload-2");

    store.create_job(new_job("brand-other")).await;
    notifier.notify();
    assert_eq!(next(&mut rx).await.len(), 1);
}

#[tokio::test]
async fn test_mock_mode_polls() {
    let store = Arc::new(DataStore::mock(APP_ID).with_poll_interval(Duration::from_millis(20)));
    let (listener, mut rx) = channel_listener();

    let _sub = store.subscribe_jobs(JobFilter::all(), listener);
    assert_eq!(next(&mut rx).await.len(), 3);

    store.create_job(new_job("brand-p")).await;

    // Picked up by a later tick without anyone notifying.
    let mut latest = next(&mut rx).await;
    while latest.len() < 4 {
        latest = next(&mut rx).await;
    }
    assert_eq!(latest[0].brand_id, "brand-p");
}

#[tokio::test]
async fn test_remote_mode_pushes_on_change() {
    let store = remote_store(Arc::new(InMemoryBackend::new()));
    let (listener, mut rx) = channel_listener();

    let _sub = store.subscribe_jobs(JobFilter::brand("brand-push"), listener);
    assert!(next(&mut rx).await.is_empty());

    // A change for another brand doesn't wake this subscriber.
    store.create_job(new_job("brand-elsewhere")).await;
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());

    let job = store.create_job(new_job("brand-push")).await;
    let pushed = next(&mut rx).await;
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].id, job.id);
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent_and_stops_delivery() {
    let store = mock_store();
    let (notifier, trigger) = manual();
    let (listener, mut rx) = channel_listener();

    let sub = store.subscribe_jobs_with(JobFilter::all(), Box::new(trigger), listener);
    next(&mut rx).await;

    sub.unsubscribe();
    sub.unsubscribe();
    assert!(!sub.is_active());

    notifier.notify();
    // The task is gone, taking the listener (and its sender) with it.
    let closed = timeout(WAIT, rx.recv()).await.expect("channel should close");
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_dropping_the_handle_unsubscribes() {
    let store = mock_store();
    let (_notifier, trigger) = manual();
    let (listener, mut rx) = channel_listener();

    let sub = store.subscribe_jobs_with(JobFilter::all(), Box::new(trigger), listener);
    next(&mut rx).await;
    drop(sub);

    let closed = timeout(WAIT, rx.recv()).await.expect("channel should close");
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_closed_trigger_ends_the_subscription() {
    let store = mock_store();
    let (notifier, trigger) = manual();
    let (listener, mut rx) = channel_listener();

    let sub = store.subscribe_jobs_with(JobFilter::all(), Box::new(trigger), listener);
    next(&mut rx).await;
    drop(notifier);

    let closed = timeout(WAIT, rx.recv()).await.expect("channel should close");
    assert!(closed.is_none());
    assert!(!sub.is_active());
}
