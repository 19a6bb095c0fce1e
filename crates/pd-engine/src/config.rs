//! Provider configuration and format-agnostic loading

use crate::retry::{Backoff, RetryPolicy, Retryable};
use crate::{Error, Result};
use pd_client::ClientConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Everything the engine needs besides the resources themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api: ClientConfig,
    pub retry: RetrySettings,
}

impl ProviderConfig {
    /// Load from `.toml`, `.json`, `.yaml`, or `.yml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ConfigStore::new().load(path.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffMode {
    #[default]
    Fixed,
    Exponential,
}

/// Retry windows and delays for each kind of operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Budget for reads, including the read that follows a create
    pub read_timeout_secs: u64,
    /// Budget for resource-specific create retries
    pub create_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
    pub retry_delay_ms: u64,
    pub rate_limit_delay_secs: u64,
    pub backoff: BackoffMode,
    /// Cap for exponential backoff
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            read_timeout_secs: 120,
            create_timeout_secs: 60,
            lookup_timeout_secs: 120,
            retry_delay_ms: 2_000,
            rate_limit_delay_secs: 30,
            backoff: BackoffMode::Fixed,
            max_delay_secs: 30,
        }
    }
}

impl RetrySettings {
    fn policy(&self, max_duration: Duration, retryable: Retryable) -> RetryPolicy {
        let backoff = match self.backoff {
            BackoffMode::Fixed => Backoff::Fixed,
            BackoffMode::Exponential => Backoff::Exponential {
                max: Duration::from_secs(self.max_delay_secs),
            },
        };

        RetryPolicy::new(max_duration)
            .with_delay(Duration::from_millis(self.retry_delay_ms))
            .with_rate_limit_delay(Duration::from_secs(self.rate_limit_delay_secs))
            .with_retryable(retryable)
            .with_backoff(backoff)
    }

    /// Reads retry every failure; the caller decides what a not-found means.
    pub fn read_policy(&self) -> RetryPolicy {
        self.policy(Duration::from_secs(self.read_timeout_secs), Retryable::Always)
    }

    pub fn create_policy(&self, retryable: Retryable) -> RetryPolicy {
        self.policy(Duration::from_secs(self.create_timeout_secs), retryable)
    }

    /// Listings only retry rate limits.
    pub fn lookup_policy(&self) -> RetryPolicy {
        self.policy(
            Duration::from_secs(self.lookup_timeout_secs),
            Retryable::RATE_LIMITED,
        )
    }
}

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        match extension(path).as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error(path, "TOML", e)),
            "json" => serde_json::from_str(&content).map_err(|e| parse_error(path, "JSON", e)),
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(path, "YAML", e))
            }
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Save using the format implied by the extension. The write is atomic.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = match extension(path).as_str() {
            "toml" => toml::to_string_pretty(value).map_err(|e| serialize_error(path, "TOML", e))?,
            "json" => serde_json::to_string_pretty(value)
                .map_err(|e| serialize_error(path, "JSON", e))?,
            "yaml" | "yml" => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(path, "YAML", e))?
            }
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        write_atomic(path, content.as_bytes())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn parse_error(path: &Path, format: &str, err: impl std::fmt::Display) -> Error {
    Error::ConfigParse {
        path: path.to_path_buf(),
        format: format.into(),
        message: err.to_string(),
    }
}

fn serialize_error(path: &Path, format: &str, err: impl std::fmt::Display) -> Error {
    Error::ConfigSerialize {
        path: path.to_path_buf(),
        format: format.into(),
        message: err.to_string(),
    }
}

/// Write-to-temp-then-rename so readers never observe a partial file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    // Dropped on any failure below, which removes the temp file.
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    temp.write_all(content).map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
