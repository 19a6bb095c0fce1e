//! `pagerduty_service_integration`: an inbound integration under a service

use pd_client::{
    Integration, IntegrationKey, ResourceApi, ServiceReference, VendorReference,
};
use pd_engine::{
    Classifier, CompositeId, Error, ErrorKind, ImportFormat, ManagedResource, Result, Retryable,
};
use serde::{Deserialize, Serialize};

pub const ERR_EMAIL_INTEGRATION_MUST_HAVE_EMAIL: &str = "integration_email attribute must be set for an integration type generic_email_inbound_integration";

pub const GENERIC_EMAIL_TYPE: &str = "generic_email_inbound_integration";

/// Payload type used when neither `type` nor `vendor` says otherwise
pub const DEFAULT_TYPE: &str = "service_integration";

pub type ServiceIntegrationApi = dyn ResourceApi<
        Key = IntegrationKey,
        Resource = Integration,
        Payload = Integration,
        Filter = String,
    >;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIntegrationResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub service: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub integration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl ServiceIntegrationResource {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, integration_type: impl Into<String>) -> Self {
        self.integration_type = Some(integration_type.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.integration_email = Some(email.into());
        self
    }

    /// Type sent to the API once defaults are applied.
    pub fn effective_type(&self) -> &str {
        set(&self.integration_type).unwrap_or(DEFAULT_TYPE)
    }
}

/// Value of an optional field only when it is set to something non-empty.
fn set(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn write_back(field: &mut Option<String>, remote: &str) {
    if !remote.is_empty() {
        *field = Some(remote.to_string());
    }
}

impl ManagedResource for ServiceIntegrationResource {
    type Api = ServiceIntegrationApi;
    const TYPE_NAME: &'static str = "pagerduty_service_integration";
    const IMPORT_FORMAT: ImportFormat = ImportFormat::new(2, "<service_id>.<integration_id>");

    // Creating an integration right after its service can fail with 400
    // until the service has propagated.
    const CREATE_RETRY: Retryable = Retryable::Kinds(&[ErrorKind::Conflict]);

    /// A fresh service can answer 400 to an integration create until it
    /// propagates, so only creates treat 400 as a conflict.
    fn create_classifier() -> Classifier {
        Classifier::bad_request_as_conflict()
    }

    fn validate(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::validation(Self::TYPE_NAME, "service must be set"));
        }
        if self.effective_type() == GENERIC_EMAIL_TYPE && set(&self.integration_email).is_none() {
            return Err(Error::validation(
                Self::TYPE_NAME,
                ERR_EMAIL_INTEGRATION_MUST_HAVE_EMAIL,
            ));
        }
        Ok(())
    }

    fn build(&self) -> Integration {
        Integration {
            kind: self.effective_type().to_string(),
            name: self.name.clone().unwrap_or_default(),
            service: Some(ServiceReference::new(&self.service)),
            vendor: set(&self.vendor).map(VendorReference::new),
            integration_key: set(&self.integration_key).unwrap_or_default().to_string(),
            integration_email: set(&self.integration_email)
                .unwrap_or_default()
                .to_string(),
            ..Default::default()
        }
    }

    fn key(&self, id: &str) -> IntegrationKey {
        IntegrationKey::new(&self.service, id)
    }

    fn remote_id(remote: &Integration) -> &str {
        &remote.id
    }

    fn apply(&mut self, remote: &Integration) {
        write_back(&mut self.name, &remote.name);
        write_back(&mut self.integration_type, &remote.kind);
        if let Some(service) = &remote.service
            && !service.id.is_empty()
        {
            self.service = service.id.clone();
        }
        if let Some(vendor) = &remote.vendor {
            write_back(&mut self.vendor, &vendor.id);
        }
        write_back(&mut self.integration_key, &remote.integration_key);
        write_back(&mut self.integration_email, &remote.integration_email);
        write_back(&mut self.html_url, &remote.html_url);
    }

    fn seed_import(&mut self, id: &CompositeId) -> String {
        self.service = id.part(0).to_string();
        id.part(1).to_string()
    }
}
