//! PagerDuty resource types for the reconciliation engine.
//!
//! Each resource here only describes its field mapping and its own policy
//! (validation, import format, which create failures are worth retrying).
//! Sequencing and retries live in `pd-engine`.
//!
//! # Modules
//!
//! - [`addon`]: full-page add-ons
//! - [`service_integration`]: inbound integrations attached to a service
//! - [`schedule`]: schedule lookup by exact name
//! - [`provider`]: [`Provider`], building reconcilers from configuration

pub mod addon;
pub mod error;
pub mod provider;
pub mod schedule;
pub mod service_integration;

pub use addon::{AddonApi, AddonResource};
pub use error::{Error, Result};
pub use provider::Provider;
pub use schedule::{ScheduleApi, ScheduleData, ScheduleLookup};
pub use service_integration::{
    ERR_EMAIL_INTEGRATION_MUST_HAVE_EMAIL, GENERIC_EMAIL_TYPE, ServiceIntegrationApi,
    ServiceIntegrationResource,
};
