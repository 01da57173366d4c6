// Readings every variant shares.

use serde_json::{Value, json};

use super::{DeviceView, ReadingFn};

/// Base entries for any device. `battery` is included only when the
/// construction-time state already carries the field, so battery-less
/// models never expose a dead reading.
pub(super) fn entries(state: &Value) -> Vec<(&'static str, ReadingFn)> {
    let mut table: Vec<(&'static str, ReadingFn)> = vec![
        ("state", device_state),
        ("state_attrs", state_attrs),
    ];
    if state.get("battery").is_some() {
        table.push(("battery", battery));
    }
    table
}

/// Vendor state codes, mapped to stable labels. Unknown codes pass
/// through raw so the host can still display them.
fn device_state(view: &DeviceView<'_>) -> Option<Value> {
    let raw = view.state.get("state").cloned().unwrap_or(json!(0));
    let label = raw.as_i64().and_then(|code| match code {
        1 => Some("online"),
        2 => Some("offline"),
        3 => Some("feeding"),
        4 => Some("mate_ota"),
        5 => Some("device_error"),
        6 => Some("battery_mode"),
        _ => None,
    });
    Some(label.map_or(raw, |l| json!(l)))
}

fn battery(view: &DeviceView<'_>) -> Option<Value> {
    view.state.get("battery").cloned()
}

/// Bundle the host hangs off the state reading: the raw code plus the
/// surrounding context fields.
fn state_attrs(view: &DeviceView<'_>) -> Option<Value> {
    Some(json!({
        "state": view.state.get("state"),
        "desc": view.state.get("desc"),
        "status": view.state.get("status").cloned().unwrap_or(json!({})),
        "shared": view.state.get("deviceShared"),
    }))
}
