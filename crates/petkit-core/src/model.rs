// ── Shared domain types ──

use serde::Serialize;
use serde_json::Value;

/// One entry of the account's device roster.
///
/// The roster is the authoritative "this device is reporting" signal;
/// the raw blob doubles as the device's lightweight state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    /// Unique device id within the account.
    pub id: i64,
    /// Vendor-reported type string, lowercased (`d4`, `t3`, ...).
    pub device_type: String,
    /// Display name set by the user in the vendor app.
    pub name: String,
    /// The full raw descriptor, kept as the device state snapshot.
    pub raw: Value,
}

impl RosterEntry {
    /// Parse a raw roster descriptor. Entries without a numeric id are
    /// dropped -- the vendor occasionally pads groups with placeholders.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let id = raw.get("id").and_then(Value::as_i64)?;
        let device_type = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase();
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Some(Self {
            id,
            device_type,
            name,
            raw: raw.clone(),
        })
    }
}
