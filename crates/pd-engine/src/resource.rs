//! The contract every managed resource type implements

use crate::import::{CompositeId, ImportFormat};
use crate::retry::Retryable;
use crate::classify::Classifier;
use crate::Result;
use pd_client::ResourceApi;

pub type KeyOf<R> = <<R as ManagedResource>::Api as ResourceApi>::Key;
pub type RemoteOf<R> = <<R as ManagedResource>::Api as ResourceApi>::Resource;
pub type PayloadOf<R> = <<R as ManagedResource>::Api as ResourceApi>::Payload;

/// A typed local record that the [`crate::Reconciler`] can drive through its
/// lifecycle against the remote API.
///
/// Implementors only describe field mapping and resource-specific policy; the
/// sequencing, retrying, and identity bookkeeping are generic.
pub trait ManagedResource: Send + Sync {
    type Api: ResourceApi + ?Sized;

    /// Resource type name used in logs and error messages
    const TYPE_NAME: &'static str;

    /// Shape of the ID accepted by import
    const IMPORT_FORMAT: ImportFormat = ImportFormat::BARE_ID;

    /// Failures the create call is retried on. Creates are not retried by default.
    const CREATE_RETRY: Retryable = Retryable::Never;

    fn classifier() -> Classifier {
        Classifier::new()
    }

    /// Classification for create calls only. Defaults to [`Self::classifier`].
    fn create_classifier() -> Classifier {
        Self::classifier()
    }

    /// Cross-field constraints checked before any create or update call.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Remote-shaped request for create and update.
    fn build(&self) -> PayloadOf<Self>;

    /// Remote address of the instance with identity `id`.
    fn key(&self, id: &str) -> KeyOf<Self>;

    fn remote_id(remote: &RemoteOf<Self>) -> &str;

    /// Write the fields present in `remote` into `self`.
    ///
    /// Fields the API left empty must be left untouched.
    fn apply(&mut self, remote: &RemoteOf<Self>);

    /// Seed the record from an import ID and return the instance identity.
    fn seed_import(&mut self, id: &CompositeId) -> String;
}
