//! [`FakeRecord`] bindings for the supported resource families.

use crate::fake::FakeRecord;
use pd_client::{Addon, Integration, IntegrationKey, ListSchedulesOptions, Schedule};

const FAKE_WEB: &str = "https://fake.pagerduty.test";

/// `/addons`: stores the payload and computes `html_url`.
pub struct AddonRecord;

impl FakeRecord for AddonRecord {
    type Key = String;
    type Resource = Addon;
    type Payload = Addon;
    type Filter = ();

    fn key_id(key: &String) -> &str {
        key
    }

    fn id(resource: &Addon) -> &str {
        &resource.id
    }

    fn set_id(resource: &mut Addon, id: &str) {
        resource.id = id.to_string();
    }

    fn materialize(id: &str, payload: &Addon) -> Addon {
        Addon {
            id: id.to_string(),
            html_url: Some(format!("{}/addons/{}", FAKE_WEB, id)),
            ..payload.clone()
        }
    }

    fn matches(_filter: &(), _resource: &Addon) -> bool {
        true
    }
}

/// `/services/{service}/integrations`: computes `html_url`, and an
/// `integration_key` for every type except email integrations.
pub struct IntegrationRecord;

impl FakeRecord for IntegrationRecord {
    type Key = IntegrationKey;
    type Resource = Integration;
    type Payload = Integration;
    type Filter = String;

    fn key_id(key: &IntegrationKey) -> &str {
        &key.integration_id
    }

    fn id(resource: &Integration) -> &str {
        &resource.id
    }

    fn set_id(resource: &mut Integration, id: &str) {
        resource.id = id.to_string();
    }

    fn materialize(id: &str, payload: &Integration) -> Integration {
        let service_id = payload
            .service
            .as_ref()
            .map(|service| service.id.clone())
            .unwrap_or_default();

        let integration_key = match (
            payload.integration_key.is_empty(),
            payload.kind.as_str(),
        ) {
            (false, _) => payload.integration_key.clone(),
            (true, "generic_email_inbound_integration") => String::new(),
            (true, _) => format!("key-{}", id.to_lowercase()),
        };

        Integration {
            id: id.to_string(),
            integration_key,
            html_url: format!("{}/services/{}/integrations/{}", FAKE_WEB, service_id, id),
            ..payload.clone()
        }
    }

    fn matches(service_id: &String, resource: &Integration) -> bool {
        resource
            .service
            .as_ref()
            .is_some_and(|service| &service.id == service_id)
    }
}

/// `/schedules`: listing matches the query as a case-insensitive substring,
/// the way the real API does.
pub struct ScheduleRecord;

impl FakeRecord for ScheduleRecord {
    type Key = String;
    type Resource = Schedule;
    type Payload = Schedule;
    type Filter = ListSchedulesOptions;

    fn key_id(key: &String) -> &str {
        key
    }

    fn id(resource: &Schedule) -> &str {
        &resource.id
    }

    fn set_id(resource: &mut Schedule, id: &str) {
        resource.id = id.to_string();
    }

    fn materialize(id: &str, payload: &Schedule) -> Schedule {
        Schedule {
            id: id.to_string(),
            html_url: Some(format!("{}/schedules/{}", FAKE_WEB, id)),
            ..payload.clone()
        }
    }

    fn matches(filter: &ListSchedulesOptions, resource: &Schedule) -> bool {
        resource
            .name
            .to_lowercase()
            .contains(&filter.query.to_lowercase())
    }
}
