//! Wiring from configuration to ready-to-use reconcilers

use crate::Result;
use crate::addon::AddonResource;
use crate::schedule::ScheduleLookup;
use crate::service_integration::ServiceIntegrationResource;
use pd_client::{AddonsApi, HttpClient, SchedulesApi, ServiceIntegrationsApi};
use pd_engine::{Lookup, ProviderConfig, Reconciler, RetrySettings};
use std::path::Path;

/// Owns the shared client and hands out per-resource reconcilers.
///
/// The provider holds no per-resource state. Reconcilers borrow it, so any
/// number of them can run at once from the caller's side.
#[derive(Debug, Clone)]
pub struct Provider {
    client: HttpClient,
    addons: AddonsApi,
    integrations: ServiceIntegrationsApi,
    schedules: SchedulesApi,
    settings: RetrySettings,
}

impl Provider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = HttpClient::new(&config.api)?;
        tracing::info!(base_url = %client.base_url(), "Configured PagerDuty client");

        Ok(Self {
            addons: AddonsApi::new(client.clone()),
            integrations: ServiceIntegrationsApi::new(client.clone()),
            schedules: SchedulesApi::new(client.clone()),
            client,
            settings: config.retry.clone(),
        })
    }

    /// Build from a config file in any supported format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = ProviderConfig::load(path)?;
        Self::new(&config)
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    pub fn addons(&self) -> Reconciler<'_, AddonResource> {
        Reconciler::<AddonResource>::with_settings(&self.addons, self.settings.clone())
    }

    pub fn service_integrations(&self) -> Reconciler<'_, ServiceIntegrationResource> {
        Reconciler::<ServiceIntegrationResource>::with_settings(
            &self.integrations,
            self.settings.clone(),
        )
    }

    pub fn schedules(&self) -> Lookup<'_, ScheduleLookup> {
        Lookup::<ScheduleLookup>::with_settings(&self.schedules, self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_client::ClientConfig;
    use std::io::Write;
    use url::Url;

    #[test]
    fn test_new_uses_configured_base_url() {
        let config = ProviderConfig {
            api: ClientConfig::default()
                .with_token("test-token")
                .with_base_url(Url::parse("http://127.0.0.1:9/").unwrap()),
            retry: RetrySettings::default(),
        };

        let provider = Provider::new(&config).unwrap();

        assert_eq!(provider.client().base_url().as_str(), "http://127.0.0.1:9/");
        assert_eq!(provider.settings(), &RetrySettings::default());
    }

    #[test]
    fn test_reconcilers_share_provider_settings() {
        let config = ProviderConfig {
            api: ClientConfig::default().with_token("test-token"),
            retry: RetrySettings {
                create_timeout_secs: 5,
                lookup_timeout_secs: 7,
                ..RetrySettings::default()
            },
        };
        let provider = Provider::new(&config).unwrap();

        assert_eq!(provider.addons().settings().create_timeout_secs, 5);
        assert_eq!(provider.service_integrations().settings().create_timeout_secs, 5);
        assert_eq!(provider.schedules().settings().lookup_timeout_secs, 7);
    }

    #[test]
    fn test_from_path_reads_retry_settings() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\ntoken = \"test-token\"\n\n[retry]\nread_timeout_secs = 10\n"
        )
        .unwrap();

        let provider = Provider::from_path(file.path()).unwrap();

        assert_eq!(provider.settings().read_timeout_secs, 10);
        assert_eq!(provider.settings().create_timeout_secs, 60);
    }

    #[test]
    fn test_from_path_rejects_unknown_format() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(Provider::from_path(file.path()).is_err());
    }
}
