//! The remote resource interface consumed by the reconciliation engine

use crate::Result;
use async_trait::async_trait;

/// Typed CRUD surface of one remote resource family.
///
/// Implementations issue exactly one remote call per method and never retry;
/// retrying is the caller's concern.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Address of a single resource (a bare ID, or parent + child for sub-resources)
    type Key: Send + Sync;
    /// Server-side representation
    type Resource: Send + Sync;
    /// Request body for create and update
    type Payload: Send + Sync;
    /// Listing scope
    type Filter: Send + Sync;

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Resource>>;

    async fn get(&self, key: &Self::Key) -> Result<Self::Resource>;

    async fn create(&self, payload: &Self::Payload) -> Result<Self::Resource>;

    async fn update(&self, key: &Self::Key, payload: &Self::Payload) -> Result<Self::Resource>;

    async fn delete(&self, key: &Self::Key) -> Result<()>;
}
