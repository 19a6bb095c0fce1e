//! Generic per-instance lifecycle driver
//!
//! Sequences validate → build → create/update/delete → fetch for any
//! [`ManagedResource`], using the retry controller where the remote service
//! is eventually consistent.

use crate::classify::ErrorKind;
use crate::config::RetrySettings;
use crate::resource::ManagedResource;
use crate::retry::retry;
use crate::state::{Lifecycle, LocalState};
use crate::{Error, Result};
use pd_client::ResourceApi;

/// How a fetch treats a failed read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// A not-found read means the resource was deleted out of band: clear the
    /// identity and succeed. Other failures keep retrying.
    SwallowNotFound,
    /// Every failure keeps retrying until the budget runs out, then fails.
    /// Used right after a create, when the resource is known to exist.
    FailHard,
}

/// Drives one resource type through create, read, update, and delete.
///
/// The API handle is injected; the reconciler holds no other shared state.
/// Callers must not run two operations on the same [`LocalState`] concurrently.
pub struct Reconciler<'a, R: ManagedResource> {
    api: &'a R::Api,
    settings: RetrySettings,
}

impl<'a, R: ManagedResource> Reconciler<'a, R> {
    pub fn new(api: &'a R::Api) -> Self {
        Self::with_settings(api, RetrySettings::default())
    }

    pub fn with_settings(api: &'a R::Api, settings: RetrySettings) -> Self {
        Self { api, settings }
    }

    pub fn api(&self) -> &'a R::Api {
        self.api
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// Create the remote resource and read it back.
    ///
    /// Validation runs first and never touches the network. The create call is
    /// only retried on the failures in [`ManagedResource::CREATE_RETRY`]. Once the
    /// create succeeds the identity is bound, and any failure of the follow-up
    /// read is returned with the instance left in [`Lifecycle::Creating`].
    pub async fn create(&self, state: &mut LocalState<R>) -> Result<()> {
        state.attrs.validate()?;
        let payload = state.attrs.build();

        tracing::info!(resource = R::TYPE_NAME, "Creating");
        state.set_lifecycle(Lifecycle::Creating);

        let policy = self.settings.create_policy(R::CREATE_RETRY);
        let classifier = R::create_classifier();
        let api = self.api;
        let payload = &payload;

        let created = retry(&policy, move || async move {
            api.create(payload)
                .await
                .map_err(|e| Error::from(classifier.classify(e)))
        })
        .await;

        let created = match created {
            Ok(created) => created,
            Err(err) => {
                tracing::warn!(resource = R::TYPE_NAME, error = %err, "Create failed");
                state.set_lifecycle(Lifecycle::Absent);
                return Err(err);
            }
        };

        state.set_id(R::remote_id(&created));
        tracing::info!(resource = R::TYPE_NAME, id = ?state.id(), "Created");

        self.fetch(state, ReadMode::FailHard).await
    }

    /// Refresh local state from the remote resource.
    ///
    /// A resource deleted out of band clears the identity without error.
    pub async fn read(&self, state: &mut LocalState<R>) -> Result<()> {
        tracing::info!(resource = R::TYPE_NAME, id = ?state.id(), "Reading");
        self.fetch(state, ReadMode::SwallowNotFound).await
    }

    /// Fetch by identity with the read retry window and write the result back.
    ///
    /// Without an identity there is nothing to fetch and this is a no-op.
    pub async fn fetch(&self, state: &mut LocalState<R>, mode: ReadMode) -> Result<()> {
        let Some(id) = state.id().map(str::to_owned) else {
            return Ok(());
        };

        let key = state.attrs.key(&id);
        let policy = self.settings.read_policy();
        let classifier = R::classifier();
        let api = self.api;
        let key = &key;

        let fetched = retry(&policy, move || async move {
            match api.get(key).await {
                Ok(remote) => Ok(Some(remote)),
                Err(e) => {
                    let err = classifier.classify(e);
                    tracing::warn!(resource = R::TYPE_NAME, error = %err, "Read error");
                    match (mode, err.kind) {
                        (ReadMode::SwallowNotFound, ErrorKind::NotFound) => Ok(None),
                        _ => Err(Error::from(err)),
                    }
                }
            }
        })
        .await?;

        match fetched {
            Some(remote) => {
                state.attrs.apply(&remote);
                state.set_lifecycle(Lifecycle::Present);
            }
            None => {
                tracing::info!(
                    resource = R::TYPE_NAME,
                    id = %id,
                    "Resource no longer exists, removing from state"
                );
                state.clear_id();
                state.set_lifecycle(Lifecycle::Absent);
            }
        }

        Ok(())
    }

    /// Push local changes with a single, unretried update call.
    pub async fn update(&self, state: &mut LocalState<R>) -> Result<()> {
        let id = state
            .id()
            .map(str::to_owned)
            .ok_or(Error::MissingIdentity {
                resource: R::TYPE_NAME,
                operation: "update",
            })?;

        state.attrs.validate()?;
        let payload = state.attrs.build();
        let key = state.attrs.key(&id);

        tracing::info!(resource = R::TYPE_NAME, id = %id, "Updating");

        self.api
            .update(&key, &payload)
            .await
            .map_err(|e| R::classifier().classify(e))?;

        Ok(())
    }

    /// Delete with a single, unretried call, then unbind the identity.
    ///
    /// A resource that is already gone counts as deleted.
    pub async fn delete(&self, state: &mut LocalState<R>) -> Result<()> {
        let Some(id) = state.id().map(str::to_owned) else {
            state.set_lifecycle(Lifecycle::Deleted);
            return Ok(());
        };

        let key = state.attrs.key(&id);

        tracing::info!(resource = R::TYPE_NAME, id = %id, "Deleting");

        if let Err(e) = self.api.delete(&key).await {
            let err = R::classifier().classify(e);
            if !err.is_not_found() {
                return Err(err.into());
            }
            tracing::info!(resource = R::TYPE_NAME, id = %id, "Already deleted");
        }

        state.clear_id();
        state.set_lifecycle(Lifecycle::Deleted);
        Ok(())
    }
}
