//! Wire representations of the remote resources

use serde::{Deserialize, Serialize};

/// Full-page add-on installed into the web UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ServiceReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "service".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl VendorReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "vendor".to_string(),
        }
    }
}

/// Inbound integration attached to a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorReference>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub integration_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub integration_email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html_url: String,
}

/// Address of an integration: integrations only exist under a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegrationKey {
    pub service_id: String,
    pub integration_id: String,
}

impl IntegrationKey {
    pub fn new(service_id: impl Into<String>, integration_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            integration_id: integration_id.into(),
        }
    }
}

/// On-call schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// Options for listing schedules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSchedulesOptions {
    /// Server-side substring query on the schedule name
    pub query: String,
}

impl ListSchedulesOptions {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Pagination fields shared by every listing response
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub more: bool,
}
