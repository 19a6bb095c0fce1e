//! Reconciliation and retry engine for PagerDuty-managed resources
//!
//! Keeps locally declared resource state convergent with a rate-limited,
//! eventually-consistent remote API:
//!
//! - **Classification**: raw client failures mapped onto [`ErrorKind`]
//! - **Retry controller**: bounded wall-clock retries with fixed delays and a
//!   mandatory long delay after rate limiting
//! - **Reconciler**: the per-instance create/read/update/delete lifecycle
//! - **Import**: composite-ID validation and existence check
//! - **Lookup**: exact-match resolution over a loosely filtered listing
//!
//! # Architecture
//!
//! ```text
//!          orchestrator
//!               |
//!     Reconciler / Lookup
//!               |
//!         retry controller ── classifier
//!               |
//!     pd-client::ResourceApi
//! ```
//!
//! The remote API handle is always passed in explicitly. Operations on one
//! resource instance must be issued sequentially by the caller.

pub mod classify;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod lookup;
pub mod reconciler;
pub mod resource;
pub mod retry;
pub mod state;

pub use classify::{Classifier, ErrorKind, RemoteError, classify};
pub use config::{BackoffMode, ConfigStore, ProviderConfig, RetrySettings};
pub use error::{Error, Result};
pub use import::{CompositeId, IMPORT_DELIMITER, ImportFormat};
pub use lookup::{Lookup, LookupSource};
pub use reconciler::{ReadMode, Reconciler};
pub use resource::ManagedResource;
pub use retry::{Backoff, Classified, RetryPolicy, Retryable, retry};
pub use state::{Attributes, Lifecycle, LocalState};
