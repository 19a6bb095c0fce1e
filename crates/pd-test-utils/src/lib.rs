//! Shared test utilities for the pagerduty-reconciler workspace.
//!
//! This crate provides in-memory fakes of the remote API so engine and
//! resource tests never touch the network. It is a dev-dependency only.
//!
//! # Modules
//!
//! - [`fake`]: [`FakeApi`], a scriptable `ResourceApi` that records every call
//! - [`records`]: storage bindings for add-ons, integrations, and schedules
//!
//! # Example
//!
//! ```rust,no_run
//! use pd_test_utils::{AddonRecord, FakeApi, Failure, Op};
//!
//! let api = FakeApi::<AddonRecord>::new();
//! api.script(Op::Get, Failure::status(429).times(2));
//! assert_eq!(api.calls_for(Op::Get), 0);
//! ```

pub mod fake;
pub mod records;

pub use fake::{Call, FakeApi, FakeRecord, Failure, Op};
pub use records::{AddonRecord, IntegrationRecord, ScheduleRecord};
