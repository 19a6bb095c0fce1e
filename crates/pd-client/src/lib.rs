//! Typed PagerDuty REST client
//!
//! Provides the [`ResourceApi`] trait the reconciliation engine consumes, the
//! wire types of the supported resources, and an HTTP implementation.
//!
//! Every method issues a single request. Retrying, classification of failures,
//! and reconciliation with local state live in `pd-engine`.

pub mod api;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod types;

pub use api::ResourceApi;
pub use config::ClientConfig;
pub use endpoints::{AddonsApi, SchedulesApi, ServiceIntegrationsApi};
pub use error::{Error, Result};
pub use http::HttpClient;
pub use types::{
    Addon, Integration, IntegrationKey, ListSchedulesOptions, Schedule, ServiceReference,
    VendorReference,
};
