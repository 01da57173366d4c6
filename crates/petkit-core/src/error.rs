// ── Core error types ──
//
// Host-facing errors from petkit-core. These are NOT transport-specific:
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<petkit_api::Error>` impl translates API-layer errors into
// the conditions the host distinguishes -- "credentials are stale"
// versus "this cycle failed, try again later".

use thiserror::Error;

use crate::action::ActionKind;
use crate::device::DeviceKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credentials are stale -- the host must run its re-authorization
    /// flow. Terminal for the current cycle, never retried locally.
    #[error("Re-authentication required: {message}")]
    AuthenticationRequired { message: String },

    /// The cycle failed for a non-auth reason (vendor error, transport
    /// problem). Transient: the next poll starts fresh.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    /// The whole poll cycle exceeded its time budget.
    #[error("Poll cycle timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// No device with this roster id is known to the coordinator.
    #[error("Device not found: {id}")]
    DeviceNotFound { id: i64 },

    /// The device's variant does not expose this action.
    #[error("Action {action} not supported by {kind} devices")]
    UnsupportedAction { kind: DeviceKind, action: ActionKind },

    /// Invalid configuration handed in by the host.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from API-layer errors ─────────────────────────────────

impl From<petkit_api::Error> for CoreError {
    fn from(err: petkit_api::Error) -> Self {
        match err {
            petkit_api::Error::Authentication { message, .. } => {
                CoreError::AuthenticationRequired { message }
            }
            petkit_api::Error::Api { code, message } => CoreError::UpdateFailed {
                message: format!("PetKit API error (code {code}): {message}"),
            },
            petkit_api::Error::Transport(e) => CoreError::UpdateFailed {
                message: e.to_string(),
            },
            petkit_api::Error::Deserialization { message, .. } => CoreError::UpdateFailed {
                message: format!("Deserialization error: {message}"),
            },
            petkit_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
        }
    }
}

impl CoreError {
    /// Whether the host should launch its re-authorization flow.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::AuthenticationRequired { .. })
    }
}
