//! Configuration files feeding the reconcilers

use pd_client::Addon;
use pd_engine::{BackoffMode, ConfigStore, LocalState, ProviderConfig, Reconciler, RetrySettings};
use pd_resources::{AddonResource, Provider};
use pd_test_utils::{AddonRecord, FakeApi, Failure, Op};
use pretty_assertions::assert_eq;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_config_overrides_retry_windows() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "provider.yaml",
        r#"
api:
  token: yaml-token
  base_url: "https://api.eu.pagerduty.com"
retry:
  read_timeout_secs: 30
  retry_delay_ms: 500
  backoff: exponential
"#,
    );

    let config = ProviderConfig::load(&path).unwrap();

    assert_eq!(config.api.token, "yaml-token");
    assert_eq!(config.api.base_url.as_str(), "https://api.eu.pagerduty.com/");
    assert_eq!(config.retry.read_timeout_secs, 30);
    assert_eq!(config.retry.backoff, BackoffMode::Exponential);
    // Unset fields keep their defaults
    assert_eq!(config.retry.create_timeout_secs, 60);
    assert_eq!(config.retry.rate_limit_delay_secs, 30);
}

#[test]
fn test_saved_config_loads_back_in_another_format() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new();
    let config = ProviderConfig {
        retry: RetrySettings {
            lookup_timeout_secs: 15,
            ..RetrySettings::default()
        },
        ..ProviderConfig::default()
    };

    let json = dir.path().join("provider.json");
    store.save(&json, &config).unwrap();
    let loaded: ProviderConfig = store.load(&json).unwrap();
    assert_eq!(loaded.retry, config.retry);

    let toml = dir.path().join("provider.toml");
    store.save(&toml, &loaded).unwrap();
    let reloaded = ProviderConfig::load(&toml).unwrap();
    assert_eq!(reloaded.retry.lookup_timeout_secs, 15);
}

#[test]
fn test_provider_from_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "provider.toml",
        r#"
[api]
token = "toml-token"
base_url = "http://127.0.0.1:9"

[retry]
create_timeout_secs = 5
"#,
    );

    let provider = Provider::from_path(&path).unwrap();

    assert_eq!(provider.client().base_url().as_str(), "http://127.0.0.1:9/");
    assert_eq!(provider.addons().settings().create_timeout_secs, 5);
}

#[test]
fn test_broken_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "provider.toml", "[retry\nread_timeout_secs = ");

    let err = ProviderConfig::load(&path).unwrap_err();

    assert!(err.to_string().contains("provider.toml"));
}

#[tokio::test(start_paused = true)]
async fn test_configured_read_window_bounds_retries() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "provider.json",
        r#"{ "retry": { "read_timeout_secs": 10, "retry_delay_ms": 1000 } }"#,
    );
    let config = ProviderConfig::load(&path).unwrap();

    let api = FakeApi::<AddonRecord>::new();
    let id = api.insert(Addon::default());
    api.script(Op::Get, Failure::status(502).always());
    let mut state = LocalState::with_id(id, AddonResource::default());
    let start = Instant::now();

    Reconciler::<AddonResource>::with_settings(&api, config.retry)
        .read(&mut state)
        .await
        .unwrap_err();

    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(api.calls_for(Op::Get), 11);
}
