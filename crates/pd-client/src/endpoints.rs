//! Typed endpoints implementing [`ResourceApi`] over [`HttpClient`]

use crate::api::ResourceApi;
use crate::http::HttpClient;
use crate::types::{Addon, Integration, IntegrationKey, ListSchedulesOptions, Schedule};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct AddonEnvelope<T> {
    addon: T,
}

#[derive(Serialize, Deserialize)]
struct IntegrationEnvelope<T> {
    integration: T,
}

#[derive(Serialize, Deserialize)]
struct ScheduleEnvelope<T> {
    schedule: T,
}

#[derive(Deserialize)]
struct ServiceIntegrations {
    service: ServiceBody,
}

#[derive(Deserialize)]
struct ServiceBody {
    #[serde(default)]
    integrations: Vec<Integration>,
}

/// `/addons`
#[derive(Clone, Debug)]
pub struct AddonsApi {
    client: HttpClient,
}

impl AddonsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi for AddonsApi {
    type Key = String;
    type Resource = Addon;
    type Payload = Addon;
    type Filter = ();

    async fn list(&self, _filter: &()) -> Result<Vec<Addon>> {
        self.client.list_all(&["addons"], "addons", &[]).await
    }

    async fn get(&self, id: &String) -> Result<Addon> {
        let body: AddonEnvelope<Addon> = self.client.get(&["addons", id.as_str()], &[]).await?;
        Ok(body.addon)
    }

    async fn create(&self, payload: &Addon) -> Result<Addon> {
        let body: AddonEnvelope<Addon> = self
            .client
            .post(&["addons"], &AddonEnvelope { addon: payload })
            .await?;
        Ok(body.addon)
    }

    async fn update(&self, id: &String, payload: &Addon) -> Result<Addon> {
        let body: AddonEnvelope<Addon> = self
            .client
            .put(&["addons", id.as_str()], &AddonEnvelope { addon: payload })
            .await?;
        Ok(body.addon)
    }

    async fn delete(&self, id: &String) -> Result<()> {
        self.client.delete(&["addons", id.as_str()]).await
    }
}

/// `/services/{service}/integrations`
#[derive(Clone, Debug)]
pub struct ServiceIntegrationsApi {
    client: HttpClient,
}

impl ServiceIntegrationsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

fn integration_path(key: &IntegrationKey) -> [&str; 4] {
    [
        "services",
        key.service_id.as_str(),
        "integrations",
        key.integration_id.as_str(),
    ]
}

#[async_trait]
impl ResourceApi for ServiceIntegrationsApi {
    type Key = IntegrationKey;
    type Resource = Integration;
    type Payload = Integration;
    /// Service ID whose integrations are listed
    type Filter = String;

    async fn list(&self, service_id: &String) -> Result<Vec<Integration>> {
        let body: ServiceIntegrations = self
            .client
            .get(
                &["services", service_id.as_str()],
                &[("include[]", "integrations".to_string())],
            )
            .await?;
        Ok(body.service.integrations)
    }

    async fn get(&self, key: &IntegrationKey) -> Result<Integration> {
        let body: IntegrationEnvelope<Integration> =
            self.client.get(&integration_path(key), &[]).await?;
        Ok(body.integration)
    }

    /// The parent service is taken from `payload.service`.
    async fn create(&self, payload: &Integration) -> Result<Integration> {
        let service_id = payload
            .service
            .as_ref()
            .map(|service| service.id.as_str())
            .unwrap_or_default();
        let body: IntegrationEnvelope<Integration> = self
            .client
            .post(
                &["services", service_id, "integrations"],
                &IntegrationEnvelope {
                    integration: payload,
                },
            )
            .await?;
        Ok(body.integration)
    }

    async fn update(&self, key: &IntegrationKey, payload: &Integration) -> Result<Integration> {
        let body: IntegrationEnvelope<Integration> = self
            .client
            .put(
                &integration_path(key),
                &IntegrationEnvelope {
                    integration: payload,
                },
            )
            .await?;
        Ok(body.integration)
    }

    async fn delete(&self, key: &IntegrationKey) -> Result<()> {
        self.client.delete(&integration_path(key)).await
    }
}

/// `/schedules`
#[derive(Clone, Debug)]
pub struct SchedulesApi {
    client: HttpClient,
}

impl SchedulesApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceApi for SchedulesApi {
    type Key = String;
    type Resource = Schedule;
    type Payload = Schedule;
    type Filter = ListSchedulesOptions;

    async fn list(&self, options: &ListSchedulesOptions) -> Result<Vec<Schedule>> {
        let query = if options.query.is_empty() {
            Vec::new()
        } else {
            vec![("query", options.query.clone())]
        };
        self.client.list_all(&["schedules"], "schedules", &query).await
    }

    async fn get(&self, id: &String) -> Result<Schedule> {
        let body: ScheduleEnvelope<Schedule> =
            self.client.get(&["schedules", id.as_str()], &[]).await?;
        Ok(body.schedule)
    }

    async fn create(&self, payload: &Schedule) -> Result<Schedule> {
        let body: ScheduleEnvelope<Schedule> = self
            .client
            .post(&["schedules"], &ScheduleEnvelope { schedule: payload })
            .await?;
        Ok(body.schedule)
    }

    async fn update(&self, id: &String, payload: &Schedule) -> Result<Schedule> {
        let body: ScheduleEnvelope<Schedule> = self
            .client
            .put(
                &["schedules", id.as_str()],
                &ScheduleEnvelope { schedule: payload },
            )
            .await?;
        Ok(body.schedule)
    }

    async fn delete(&self, id: &String) -> Result<()> {
        self.client.delete(&["schedules", id.as_str()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceReference;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_integration_path() {
        let key = IntegrationKey::new("PSVC123", "PINT456");
        assert_eq!(
            integration_path(&key),
            ["services", "PSVC123", "integrations", "PINT456"]
        );
    }

    #[test]
    fn test_envelope_wraps_payload() {
        let integration = Integration {
            kind: "service_integration".into(),
            name: "Datadog".into(),
            service: Some(ServiceReference::new("PSVC123")),
            ..Default::default()
        };

        let value = serde_json::to_value(IntegrationEnvelope {
            integration: &integration,
        })
        .unwrap();

        assert_eq!(
            value,
            json!({
                "integration": {
                    "type": "service_integration",
                    "name": "Datadog",
                    "service": {"id": "PSVC123", "type": "service"}
                }
            })
        );
    }

    #[test]
    fn test_service_integrations_listing_decodes() {
        let body: ServiceIntegrations = serde_json::from_value(json!({
            "service": {
                "id": "PSVC123",
                "integrations": [
                    {"id": "PINT1", "type": "events_api_v2_inbound_integration"},
                    {"id": "PINT2", "type": "generic_email_inbound_integration"}
                ]
            }
        }))
        .unwrap();

        let ids: Vec<_> = body.service.integrations.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["PINT1", "PINT2"]);
    }
}
