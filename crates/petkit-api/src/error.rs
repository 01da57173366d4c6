use thiserror::Error;

/// Top-level error type for the `petkit-api` crate.
///
/// Covers authentication, transport, and vendor application errors.
/// `petkit-core` maps these into host-facing conditions; consumers of
/// that crate never see these variants raw.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or a retried login was still rejected.
    ///
    /// Carries the raw response body for diagnostics.
    #[error("Authentication failed: {message}")]
    Authentication { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Vendor application errors ───────────────────────────────────
    /// Well-formed response carrying a non-zero `error.code` that is not
    /// one of the session-invalid codes.
    #[error("PetKit API error (code {code}): {message}")]
    Api { code: i64, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means credentials are stale and the
    /// host must run its re-authorization flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on a
    /// later poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
