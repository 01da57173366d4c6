// ── Runtime account configuration ──
//
// Describes *how* to reach one PetKit account. Built and validated by
// the host (config UI, credential storage); the core never reads disk.

use std::time::Duration;

use secrecy::SecretString;

use petkit_api::{Credentials, Region};

/// Default polling interval (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;
/// Default whole-cycle request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one PetKit account coordinator.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Account email address.
    pub username: String,
    /// Account password; hashed before it ever goes on the wire.
    pub password: SecretString,
    /// Which regional cloud the account lives in.
    pub region: Region,
    /// How often the host should call `Coordinator::update`.
    pub poll_interval: Duration,
    /// Time budget for one whole poll cycle.
    pub timeout: Duration,
}

impl AccountConfig {
    pub fn new(username: impl Into<String>, password: SecretString, region: Region) -> Self {
        Self {
            username: username.into(),
            password,
            region,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API credentials this configuration describes.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone(), self.region)
    }
}
