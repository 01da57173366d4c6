// PetKit account HTTP client
//
// Wraps `reqwest::Client` with region-aware URL resolution, vendor
// headers, session lifecycle, and the one-shot re-login retry the
// vendor's session-invalid error codes require. Transport and decode
// failures degrade to an empty result object so one flaky request
// never aborts a poll cycle.

use chrono::Duration;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::credentials::Credentials;
use crate::error::Error;
use crate::region::resolve;
use crate::response::{error_code, error_message, result};
use crate::session::Session;

/// Login endpoint path.
pub const LOGIN_ENDPOINT: &str = "user/login";
/// Device roster endpoint path.
pub const DEVICE_ROSTER_ENDPOINT: &str = "discovery/device_roster";

/// API version advertised in `X-Api-Version`.
const API_VERSION: &str = "7.29.1";
/// Fixed client identifier the vendor expects in `X-Client`.
const CLIENT_ID: &str = "Android(7.1.1;Xiaomi)";
const USER_AGENT: &str = "okhttp/3.12.1";

/// Application error codes the vendor uses for "session invalid" and
/// "session expired". Exactly these trigger the one re-login retry.
const AUTH_ERROR_CODES: [i64; 2] = [5, 8];

/// Re-login proactively when the session expires within this window.
const RELOGIN_WINDOW_SECS: i64 = 3600;

/// Request shapes the vendor API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// GET with params as the query string.
    Get,
    /// POST with params as the query string (the vendor's login shape).
    PostQuery,
    /// POST with params form-encoded in the body.
    PostForm,
}

/// Query/form parameters for a single request.
pub type Params = [(&'static str, String)];

/// Authenticated client for one PetKit account.
///
/// Owns the credentials and the current [`Session`]. The session is
/// only ever written by [`login`](Self::login), which replaces it
/// wholesale; a failed login leaves the previous session in place.
pub struct Account {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    session: RwLock<Option<Session>>,
}

impl Account {
    /// Create an account client against the region's API host.
    ///
    /// The `reqwest::Client` is injected so the host controls timeouts
    /// and TLS; no session exists until the first request logs in.
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Self {
        let base_url = credentials.region().base_url().to_owned();
        Self::with_base_url(http, credentials, base_url)
    }

    /// Create an account client against an explicit base URL.
    ///
    /// Used by tests and by hosts that front the vendor API with a proxy.
    pub fn with_base_url(
        http: reqwest::Client,
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.into(),
            session: RwLock::new(None),
        }
    }

    /// The credentials this account was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// A clone of the current session, if authenticated.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Authenticate with hashed credentials.
    ///
    /// On success the held session is replaced entirely (token, user id,
    /// expiry). On any failure -- non-JSON body, missing session fields,
    /// transport error -- the previous session is untouched and an
    /// [`Error::Authentication`] carries the raw response.
    pub async fn login(&self) -> Result<(), Error> {
        let params = [
            ("encrypt", "1".to_owned()),
            ("username", self.credentials.username().to_owned()),
            ("password", self.credentials.password_md5()),
            ("oldVersion", String::new()),
        ];

        let body = self
            .transport_request(LOGIN_ENDPOINT, &params, RequestKind::PostQuery)
            .await;

        let code = error_code(&body);
        if code != 0 {
            return Err(Error::Authentication {
                message: format!(
                    "login rejected for {} (code {code}): {}",
                    self.credentials.username(),
                    error_message(&body)
                ),
                body: body.to_string(),
            });
        }

        let session = Session::from_login_response(&body)?;
        debug!(
            user_id = %session.user_id,
            expires_at = ?session.expires_at,
            "login successful"
        );
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Log in if there is no session, or if the current one expires soon.
    async fn ensure_session(&self) -> Result<(), Error> {
        let stale = match &*self.session.read().await {
            None => true,
            Some(session) => session.expires_within(Duration::seconds(RELOGIN_WINDOW_SECS)),
        };
        if stale {
            self.login().await?;
        }
        Ok(())
    }

    // ── Authenticated requests ───────────────────────────────────────

    /// Issue an authenticated call against a logical endpoint.
    ///
    /// If the decoded response carries one of the vendor's
    /// session-invalid codes, performs exactly one [`login`](Self::login)
    /// and one retry of the original request. A second session-invalid
    /// code, or a failed re-login, propagates as
    /// [`Error::Authentication`]. All other application error codes are
    /// returned in the body for the caller to interpret; transport and
    /// decode failures come back as an empty object.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &Params,
        kind: RequestKind,
    ) -> Result<Value, Error> {
        self.ensure_session().await?;

        let body = self.transport_request(endpoint, params, kind).await;
        let code = error_code(&body);
        if !AUTH_ERROR_CODES.contains(&code) {
            return Ok(body);
        }

        debug!(endpoint, code, "session rejected, re-authenticating");
        self.login().await?;

        let retried = self.transport_request(endpoint, params, kind).await;
        let retried_code = error_code(&retried);
        if AUTH_ERROR_CODES.contains(&retried_code) {
            return Err(Error::Authentication {
                message: format!("session rejected after re-login (code {retried_code})"),
                body: retried.to_string(),
            });
        }
        Ok(retried)
    }

    /// One HTTP round trip. Network and decode failures are logged with
    /// full request context and degrade to `{}` -- "no data this cycle".
    async fn transport_request(
        &self,
        endpoint: &str,
        params: &Params,
        kind: RequestKind,
    ) -> Value {
        let url = resolve(&self.base_url, endpoint);

        let mut builder = match kind {
            RequestKind::Get => self.http.get(&url).query(params),
            RequestKind::PostQuery => self.http.post(&url).query(params),
            RequestKind::PostForm => self.http.post(&url).form(params),
        };
        builder = builder
            .header("User-Agent", USER_AGENT)
            .header("X-Api-Version", API_VERSION)
            .header("X-Client", CLIENT_ID)
            .header("X-Locale", self.credentials.region().locale())
            .header("X-Session", self.current_token().await);

        let outcome = async {
            let resp = builder.send().await?;
            resp.json::<Value>().await
        }
        .await;

        match outcome {
            Ok(body) => body,
            Err(e) => {
                error!(
                    method = ?kind,
                    url = %url,
                    params = ?params,
                    error = %e,
                    "PetKit API request failed"
                );
                Value::Object(serde_json::Map::new())
            }
        }
    }

    async fn current_token(&self) -> String {
        self.session
            .read()
            .await
            .as_ref()
            .map_or_else(String::new, |s| s.token.clone())
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the account's device roster.
    ///
    /// `GET discovery/device_roster` returns devices grouped by family;
    /// the groups' `data` arrays are flattened into one list of raw
    /// descriptors. A non-zero, non-auth error code surfaces as
    /// [`Error::Api`] so callers can report a failed cycle.
    pub async fn device_roster(&self) -> Result<Vec<Value>, Error> {
        let body = self
            .request(DEVICE_ROSTER_ENDPOINT, &[], RequestKind::Get)
            .await?;

        let code = error_code(&body);
        if code != 0 {
            return Err(Error::Api {
                code,
                message: error_message(&body),
            });
        }

        let entries: Vec<Value> = result(&body)
            .and_then(|r| r.get("devices"))
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|g| g.get("data").and_then(Value::as_array))
                    .flatten()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if entries.is_empty() {
            warn!(
                username = self.credentials.username(),
                body = %body,
                "device roster came back empty"
            );
        }
        Ok(entries)
    }
}
