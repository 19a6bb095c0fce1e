//! End-to-end lifecycle scenarios
//!
//! Each test drives one resource instance through the reconciler against the
//! in-memory API, on a paused clock so retry windows cost no wall time.

use pd_client::{Addon, Integration, ServiceReference};
use pd_engine::{ErrorKind, Lifecycle, LocalState, Reconciler};
use pd_resources::{AddonResource, ServiceIntegrationResource};
use pd_test_utils::{AddonRecord, FakeApi, Failure, IntegrationRecord, Op};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

fn status_page() -> AddonResource {
    AddonResource::new("Status", "https://status.example.com")
}

#[tokio::test(start_paused = true)]
async fn test_addon_full_lifecycle() {
    let api = FakeApi::<AddonRecord>::new();
    let addons = Reconciler::<AddonResource>::new(&api);

    // Create
    let mut state = LocalState::new(status_page());
    addons.create(&mut state).await.unwrap();
    let id = state.id().unwrap().to_string();
    assert_eq!(state.lifecycle(), Lifecycle::Present);

    // The orchestrator persists the attributes between runs
    let saved = state.to_attributes().unwrap();
    assert_eq!(saved["id"], json!(id));
    assert_eq!(saved["src"], json!("https://status.example.com"));
    let mut state = LocalState::<AddonResource>::from_attributes(saved).unwrap();

    // Update
    state.attrs.name = "Service Status".into();
    addons.update(&mut state).await.unwrap();
    assert_eq!(api.record(&id).unwrap().name, "Service Status");

    // Read
    addons.read(&mut state).await.unwrap();
    assert_eq!(state.attrs.name, "Service Status");

    // Delete
    addons.delete(&mut state).await.unwrap();
    assert_eq!(state.id(), None);
    assert_eq!(state.lifecycle(), Lifecycle::Deleted);
    assert!(api.is_empty());

    let ops: Vec<Op> = api.calls().into_iter().map(|call| call.op).collect();
    assert_eq!(
        ops,
        vec![Op::Create, Op::Get, Op::Update, Op::Get, Op::Delete]
    );
}

#[tokio::test(start_paused = true)]
async fn test_read_waits_out_rate_limits() {
    let api = FakeApi::<AddonRecord>::new();
    let id = api.insert(Addon {
        kind: "full_page_addon".into(),
        name: "Status".into(),
        src: "https://status.example.com".into(),
        ..Default::default()
    });
    api.script(Op::Get, Failure::status(429).times(2));
    let mut state = LocalState::with_id(id, AddonResource::default());
    let start = Instant::now();

    Reconciler::<AddonResource>::new(&api)
        .read(&mut state)
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(api.calls_for(Op::Get), 3);
    assert_eq!(state.attrs, status_page());
}

#[tokio::test(start_paused = true)]
async fn test_read_honors_longer_retry_after_hint() {
    let api = FakeApi::<AddonRecord>::new();
    let id = api.insert(Addon {
        name: "Status".into(),
        ..Default::default()
    });
    api.script(
        Op::Get,
        Failure::status(429).retry_after(Duration::from_secs(45)),
    );
    let mut state = LocalState::with_id(id, AddonResource::default());
    let start = Instant::now();

    Reconciler::<AddonResource>::new(&api)
        .read(&mut state)
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(45));
}

#[tokio::test(start_paused = true)]
async fn test_create_keeps_identity_when_follow_up_read_fails() {
    let api = FakeApi::<AddonRecord>::new();
    api.script(Op::Get, Failure::status(500).always());
    let mut state = LocalState::new(status_page());
    let start = Instant::now();

    let err = Reconciler::<AddonResource>::new(&api)
        .create(&mut state)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransientServer);
    assert_eq!(start.elapsed(), Duration::from_secs(120));
    assert_eq!(state.lifecycle(), Lifecycle::Creating);
    let id = state.id().unwrap();
    assert!(api.record(id).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_recreate_after_out_of_band_delete() {
    let api = FakeApi::<AddonRecord>::new();
    let addons = Reconciler::<AddonResource>::new(&api);
    let mut state = LocalState::new(status_page());
    addons.create(&mut state).await.unwrap();
    let first = state.id().unwrap().to_string();

    api.remove(&first);
    addons.read(&mut state).await.unwrap();
    assert_eq!(state.lifecycle(), Lifecycle::Absent);

    addons.create(&mut state).await.unwrap();
    let second = state.id().unwrap();
    assert_ne!(second, first);
    assert_eq!(api.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_integration_drift_is_read_back() {
    let api = FakeApi::<IntegrationRecord>::new();
    let integrations = Reconciler::<ServiceIntegrationResource>::new(&api);
    let mut state = LocalState::new(ServiceIntegrationResource::new("PSVC001").with_name("API"));
    integrations.create(&mut state).await.unwrap();
    let id = state.id().unwrap().to_string();

    let mut remote = api.record(&id).unwrap();
    remote.name = "Renamed in the UI".into();
    api.insert(remote);

    integrations.read(&mut state).await.unwrap();

    assert_eq!(state.attrs.name.as_deref(), Some("Renamed in the UI"));
    assert_eq!(state.attrs.service, "PSVC001");
}

#[tokio::test(start_paused = true)]
async fn test_integration_delete_tolerates_missing_remote() {
    let api = FakeApi::<IntegrationRecord>::new();
    let id = api.insert(Integration {
        kind: "service_integration".into(),
        service: Some(ServiceReference::new("PSVC001")),
        ..Default::default()
    });
    api.remove(&id);
    let mut state = LocalState::with_id(id, ServiceIntegrationResource::new("PSVC001"));

    Reconciler::<ServiceIntegrationResource>::new(&api)
        .delete(&mut state)
        .await
        .unwrap();

    assert_eq!(state.id(), None);
    assert_eq!(state.lifecycle(), Lifecycle::Deleted);
    assert_eq!(api.calls_for(Op::Delete), 1);
}
