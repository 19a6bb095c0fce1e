//! `pagerduty_schedule` data source: resolves a schedule by its exact name

use pd_client::{ListSchedulesOptions, ResourceApi, Schedule};
use pd_engine::{LocalState, Lookup, LookupSource, Result};
use serde::{Deserialize, Serialize};

pub type ScheduleApi =
    dyn ResourceApi<Key = String, Resource = Schedule, Payload = Schedule, Filter = ListSchedulesOptions>;

/// Schedules searched by `name`. The API query is a substring match, so the
/// exact-match step of [`Lookup`] is what tells `OnCallRotationA` apart from
/// `OnCallRotationAB`.
pub struct ScheduleLookup;

impl LookupSource for ScheduleLookup {
    type Api = ScheduleApi;
    const TYPE_NAME: &'static str = "schedule";
    const FIELD: &'static str = "name";

    fn filter(value: &str) -> ListSchedulesOptions {
        ListSchedulesOptions::query(value)
    }

    fn discriminant(candidate: &Schedule) -> &str {
        &candidate.name
    }

    fn identity(candidate: &Schedule) -> &str {
        &candidate.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleData {
    pub name: String,
}

impl ScheduleData {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Resolve the schedule and return state keyed by its ID.
    pub async fn read(self, lookup: &Lookup<'_, ScheduleLookup>) -> Result<LocalState<Self>> {
        let found = lookup.find(&self.name).await?;
        tracing::debug!(id = %found.id, name = %found.name, "Resolved schedule");
        Ok(LocalState::with_id(found.id, Self { name: found.name }))
    }
}
