//! Read-only resolution of a resource by a non-unique filter

use crate::classify::Classifier;
use crate::config::RetrySettings;
use crate::retry::retry;
use crate::{Error, Result};
use pd_client::ResourceApi;

pub type CandidateOf<S> = <<S as LookupSource>::Api as ResourceApi>::Resource;
pub type FilterOf<S> = <<S as LookupSource>::Api as ResourceApi>::Filter;

/// A resource family that can be searched by one discriminating field.
pub trait LookupSource: Send + Sync {
    type Api: ResourceApi + ?Sized;

    const TYPE_NAME: &'static str;
    /// Name of the discriminating field, used in error messages
    const FIELD: &'static str;

    /// Listing scope for `value`. The remote may match loosely (substring).
    fn filter(value: &str) -> FilterOf<Self>;

    fn discriminant(candidate: &CandidateOf<Self>) -> &str;

    fn identity(candidate: &CandidateOf<Self>) -> &str;
}

/// Resolves a filter value to exactly one remote resource.
pub struct Lookup<'a, S: LookupSource> {
    api: &'a S::Api,
    settings: RetrySettings,
}

impl<'a, S: LookupSource> Lookup<'a, S> {
    pub fn new(api: &'a S::Api) -> Self {
        Self::with_settings(api, RetrySettings::default())
    }

    pub fn with_settings(api: &'a S::Api, settings: RetrySettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// First listed candidate whose discriminating field equals `value` exactly
    /// (case-sensitive).
    ///
    /// Rate-limited listings are retried within the lookup window; any other
    /// failure, including "no exact match", is returned at once.
    pub async fn find(&self, value: &str) -> Result<CandidateOf<S>> {
        tracing::info!(resource = S::TYPE_NAME, field = S::FIELD, %value, "Looking up");

        let filter = S::filter(value);
        let policy = self.settings.lookup_policy();
        let classifier = Classifier::new();
        let api = self.api;
        let filter = &filter;

        retry(&policy, move || async move {
            let candidates = api
                .list(filter)
                .await
                .map_err(|e| Error::from(classifier.classify(e)))?;

            tracing::debug!(
                resource = S::TYPE_NAME,
                candidates = candidates.len(),
                "Listed candidates"
            );

            candidates
                .into_iter()
                .find(|candidate| S::discriminant(candidate) == value)
                .ok_or_else(|| Error::LookupNotFound {
                    resource: S::TYPE_NAME,
                    field: S::FIELD,
                    value: value.to_string(),
                })
        })
        .await
    }

    /// Identity of the exact match for `value`.
    pub async fn find_by_filter(&self, value: &str) -> Result<String> {
        let found = self.find(value).await?;
        Ok(S::identity(&found).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;
    use crate::retry::RATE_LIMIT_DELAY;
    use pd_client::{ListSchedulesOptions, Schedule};
    use pd_test_utils::{FakeApi, Failure, Op, ScheduleRecord};
    use tokio::time::Instant;

    struct ByName;

    impl LookupSource for ByName {
        type Api = FakeApi<ScheduleRecord>;
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

    fn schedule(name: &str) -> Schedule {
        Schedule {
            name: name.into(),
            time_zone: "UTC".into(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_match_wins_over_near_matches() {
        let api = FakeApi::<ScheduleRecord>::new();
        api.insert(schedule("Primary On-Call Extended"));
        api.insert(schedule("primary on-call"));
        let wanted = api.insert(schedule("Primary On-Call"));

        let id = Lookup::<ByName>::new(&api)
            .find_by_filter("Primary On-Call")
            .await
            .unwrap();

        assert_eq!(id, wanted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_exact_match_is_not_retried() {
        let api = FakeApi::<ScheduleRecord>::new();
        api.insert(schedule("Primary On-Call Extended"));
        let start = Instant::now();

        let err = Lookup::<ByName>::new(&api)
            .find_by_filter("Primary On-Call")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("Primary On-Call"));
        assert_eq!(api.calls_for(Op::List), 1);
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_listing_is_not_found() {
        let api = FakeApi::<ScheduleRecord>::new();

        let err = Lookup::<ByName>::new(&api).find("Nobody").await.unwrap_err();

        assert!(matches!(err, Error::LookupNotFound { ref value, .. } if value == "Nobody"));
        assert_eq!(api.calls_for(Op::List), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_listing_waits_then_retries() {
        let api = FakeApi::<ScheduleRecord>::new();
        let wanted = api.insert(schedule("Night Shift"));
        api.script(Op::List, Failure::status(429).times(2));
        let start = Instant::now();

        let id = Lookup::<ByName>::new(&api)
            .find_by_filter("Night Shift")
            .await
            .unwrap();

        assert_eq!(id, wanted);
        assert_eq!(api.calls_for(Op::List), 3);
        assert_eq!(start.elapsed(), RATE_LIMIT_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_listing_failures_are_immediate() {
        let api = FakeApi::<ScheduleRecord>::new();
        api.script(Op::List, Failure::status(500).times(1));

        let err = Lookup::<ByName>::new(&api)
            .find_by_filter("Night Shift")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientServer);
        assert_eq!(api.calls_for(Op::List), 1);
    }
}
