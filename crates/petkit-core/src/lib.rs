//! Device model and polling engine for the PetKit cloud.
//!
//! Built on [`petkit_api`], this crate turns raw vendor blobs into a
//! typed device set with derived readings and control actions:
//!
//! - [`Coordinator`] polls one account: roster fetch, state
//!   reconciliation, per-device detail refresh.
//! - [`Device`] holds wholesale-replaced state snapshots and evaluates
//!   its variant's reading table on demand.
//! - [`Action`] descriptors map onto the vendor's control endpoints.
//!
//! The host owns scheduling, credential storage and re-auth UX; the
//! core reports [`CoreError::AuthenticationRequired`] and waits.

pub mod action;
pub mod config;
pub mod coordinator;
pub mod device;
pub mod error;
pub mod model;

pub use action::{Action, ActionKind, LitterCommand};
pub use config::{AccountConfig, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS};
pub use coordinator::Coordinator;
pub use device::{Device, DeviceKind, Family};
pub use error::CoreError;
pub use model::RosterEntry;

pub use petkit_api::{Credentials, Region, Session};
