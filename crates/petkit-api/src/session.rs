// Session state
//
// A session is produced whole by a successful login and replaced whole
// by the next one. Nothing here mutates fields in place.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::Error;

/// Timestamp format of the login response's `createdAt` field.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// An authenticated session with the PetKit cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque session token, sent as the `X-Session` header.
    pub token: String,
    /// The account's user id as reported by the login endpoint.
    pub user_id: String,
    /// When the session expires, if the response carried enough to tell.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Parse a session out of a login response body.
    ///
    /// Requires `result.session.id` and `result.session.userId`; the
    /// expiry is derived from `createdAt` + `expiresIn` when both parse,
    /// and left unset otherwise. Anything less is an authentication
    /// failure carrying the raw body.
    pub(crate) fn from_login_response(body: &Value) -> Result<Self, Error> {
        let session = body
            .get("result")
            .and_then(|r| r.get("session"))
            .ok_or_else(|| auth_error(body))?;

        let token = session
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| auth_error(body))?
            .to_owned();
        let user_id = session
            .get("userId")
            .map(json_id_string)
            .ok_or_else(|| auth_error(body))?;

        let expires_at = session
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDateTime::parse_from_str(s, CREATED_AT_FORMAT).ok())
            .map(|dt| dt.and_utc())
            .zip(session.get("expiresIn").and_then(Value::as_i64))
            .map(|(created, secs)| created + Duration::seconds(secs));

        Ok(Self {
            token,
            user_id,
            expires_at,
        })
    }

    /// Whether the session expires within `window` of now.
    ///
    /// Sessions without a known expiry never report as expiring.
    pub fn expires_within(&self, window: Duration) -> bool {
        self.expires_at
            .is_some_and(|at| at - Utc::now() < window)
    }
}

/// User ids arrive as either a JSON string or a bare number.
fn json_id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn auth_error(body: &Value) -> Error {
    Error::Authentication {
        message: "login response missing session fields".into(),
        body: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn login_body() -> Value {
        json!({
            "result": {
                "session": {
                    "id": "tok-123",
                    "userId": "u-9",
                    "createdAt": "2024-06-15T10:30:00.000Z",
                    "expiresIn": 2_592_000
                }
            }
        })
    }

    #[test]
    fn parses_full_session() {
        let session = Session::from_login_response(&login_body()).expect("session");
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user_id, "u-9");
        let expires = session.expires_at.expect("expiry");
        assert_eq!(expires.to_rfc3339(), "2024-07-15T10:30:00+00:00");
    }

    #[test]
    fn numeric_user_id_is_stringified() {
        let body = json!({
            "result": { "session": { "id": "tok", "userId": 42 } }
        });
        let session = Session::from_login_response(&body).expect("session");
        assert_eq!(session.user_id, "42");
        assert!(session.expires_at.is_none());
    }

    #[test]
    fn missing_session_fields_fail_with_raw_body() {
        let body = json!({ "result": {} });
        let err = Session::from_login_response(&body).expect_err("should fail");
        match err {
            Error::Authentication { body: raw, .. } => {
                assert!(raw.contains("result"));
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn expiry_window_check() {
        let mut session = Session::from_login_response(&login_body()).expect("session");
        session.expires_at = Some(Utc::now() + Duration::seconds(30));
        assert!(session.expires_within(Duration::seconds(3600)));
        session.expires_at = Some(Utc::now() + Duration::seconds(7200));
        assert!(!session.expires_within(Duration::seconds(3600)));
        session.expires_at = None;
        assert!(!session.expires_within(Duration::seconds(3600)));
    }
}
