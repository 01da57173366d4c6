// Litter-box readings (Pura X / Pura Max).
//
// The roster `status` block carries live box state; the fetched detail
// carries counters and settings; the event records feed the
// last-record and pet-weight readings.

use serde_json::{Value, json};

use super::{DeviceView, ReadingFn};

pub(super) fn entries() -> Vec<(&'static str, ReadingFn)> {
    vec![
        ("power", power),
        ("box_full", box_full),
        ("sand_percent", sand_percent),
        ("sand_attrs", sand_attrs),
        ("liquid", liquid),
        ("liquid_attrs", liquid_attrs),
        ("work_mode", work_mode),
        ("action", current_action),
        ("in_times", in_times),
        ("manual_lock", manual_lock),
        ("last_record", last_record),
        ("pet_weight", pet_weight),
    ]
}

fn status<'a>(view: &DeviceView<'a>) -> Option<&'a Value> {
    view.state.get("status")
}

/// Current work-mode code from the live status block; -1 when idle or
/// unreported. Also drives the pause/continue/end control payloads.
pub(crate) fn work_mode_code(state: &Value) -> i64 {
    state
        .get("status")
        .and_then(|s| s.get("workState"))
        .and_then(|w| w.get("workMode"))
        .and_then(Value::as_i64)
        .unwrap_or(-1)
}

fn power(view: &DeviceView<'_>) -> Option<Value> {
    let on = status(view)?
        .get("power")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(on != 0))
}

fn box_full(view: &DeviceView<'_>) -> Option<Value> {
    status(view)?.get("boxFull").cloned()
}

fn sand_percent(view: &DeviceView<'_>) -> Option<Value> {
    status(view)?.get("sandPercent").cloned()
}

/// Bundle behind the sand-level reading.
fn sand_attrs(view: &DeviceView<'_>) -> Option<Value> {
    let status = status(view)?;
    Some(json!({
        "sand_lack": status.get("sandLack"),
        "sand_weight": status.get("sandWeight"),
    }))
}

/// Deodorant liquid level (percent).
fn liquid(view: &DeviceView<'_>) -> Option<Value> {
    status(view)?.get("liquid").cloned()
}

/// Bundle behind the liquid reading.
fn liquid_attrs(view: &DeviceView<'_>) -> Option<Value> {
    let status = status(view)?;
    Some(json!({
        "liquid": status.get("liquid"),
        "liquid_empty": status.get("liquidEmpty"),
        "liquid_lack": status.get("liquidLack"),
    }))
}

fn work_mode(view: &DeviceView<'_>) -> Option<Value> {
    Some(json!(work_mode_code(view.state)))
}

/// The running maintenance action; `idle` when nothing is running.
fn current_action(view: &DeviceView<'_>) -> Option<Value> {
    let label = match work_mode_code(view.state) {
        0 => "cleanup",
        2 => "deodorize",
        9 => "maintain",
        _ => "idle",
    };
    Some(json!(label))
}

/// How many times a pet entered today.
fn in_times(view: &DeviceView<'_>) -> Option<Value> {
    view.detail.get("inTimes").cloned()
}

fn manual_lock(view: &DeviceView<'_>) -> Option<Value> {
    let locked = view
        .detail
        .get("settings")
        .and_then(|s| s.get("manualLock"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(locked != 0))
}

fn records<'a>(view: &DeviceView<'a>) -> &'a [Value] {
    view.records.as_array().map_or(&[], Vec::as_slice)
}

/// The most recent event, as a stable label. Unknown event codes pass
/// through raw.
fn last_record(view: &DeviceView<'_>) -> Option<Value> {
    let code = records(view)
        .last()
        .and_then(|r| r.get("eventType"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let label = match code {
        5 => "cleaned",
        6 => "dumped",
        7 => "reset",
        8 => "deodorized",
        10 => "occupied",
        other => return Some(json!(other)),
    };
    Some(json!(label))
}

/// Weight (grams) from the newest occupancy event that actually
/// carries a measurement. Scans newest-first; events without content
/// are skipped.
fn pet_weight(view: &DeviceView<'_>) -> Option<Value> {
    records(view)
        .iter()
        .rev()
        .find(|r| {
            r.get("eventType").and_then(Value::as_i64) == Some(10)
                && r.get("content")
                    .is_some_and(|c| !super::is_empty_payload(c))
        })
        .and_then(|r| r.get("content"))
        .and_then(|c| c.get("petWeight"))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view<'a>(state: &'a Value, detail: &'a Value, records: &'a Value) -> DeviceView<'a> {
        DeviceView {
            state,
            detail,
            records,
        }
    }

    #[test]
    fn status_readings_from_the_roster_blob() {
        let state = json!({
            "status": {
                "power": 1,
                "boxFull": false,
                "sandPercent": 64,
                "liquid": 80,
                "workState": { "workMode": 0 },
            }
        });
        let empty = json!({});
        let none = json!([]);
        let v = view(&state, &empty, &none);

        assert_eq!(power(&v), Some(json!(true)));
        assert_eq!(box_full(&v), Some(json!(false)));
        assert_eq!(sand_percent(&v), Some(json!(64)));
        assert_eq!(liquid(&v), Some(json!(80)));
        assert_eq!(work_mode(&v), Some(json!(0)));
        assert_eq!(current_action(&v), Some(json!("cleanup")));
    }

    #[test]
    fn idle_box_reports_no_action() {
        let state = json!({ "status": {} });
        let empty = json!({});
        let none = json!([]);
        let v = view(&state, &empty, &none);
        assert_eq!(work_mode(&v), Some(json!(-1)));
        assert_eq!(current_action(&v), Some(json!("idle")));
    }

    #[test]
    fn level_bundles_carry_the_warning_flags() {
        let state = json!({
            "status": {
                "sandLack": 0,
                "sandWeight": 1530,
                "liquid": 80,
                "liquidEmpty": 0,
                "liquidLack": 1,
            }
        });
        let empty = json!({});
        let none = json!([]);
        let v = view(&state, &empty, &none);

        assert_eq!(
            sand_attrs(&v),
            Some(json!({ "sand_lack": 0, "sand_weight": 1530 }))
        );
        assert_eq!(
            liquid_attrs(&v),
            Some(json!({ "liquid": 80, "liquid_empty": 0, "liquid_lack": 1 }))
        );
    }

    #[test]
    fn manual_lock_reads_the_settings_block() {
        let state = json!({});
        let none = json!([]);
        let locked = json!({ "settings": { "manualLock": 1 } });
        assert_eq!(manual_lock(&view(&state, &locked, &none)), Some(json!(true)));

        let unlocked = json!({ "settings": { "manualLock": 0 } });
        assert_eq!(
            manual_lock(&view(&state, &unlocked, &none)),
            Some(json!(false))
        );

        let absent = json!({});
        assert_eq!(
            manual_lock(&view(&state, &absent, &none)),
            Some(json!(false))
        );
    }

    #[test]
    fn last_record_maps_known_event_codes() {
        let state = json!({});
        let empty = json!({});
        let records = json!([
            { "eventType": 10, "content": { "petWeight": 4100 } },
            { "eventType": 5 },
        ]);
        let v = view(&state, &empty, &records);
        assert_eq!(last_record(&v), Some(json!("cleaned")));

        let unknown = json!([{ "eventType": 99 }]);
        let v = view(&state, &empty, &unknown);
        assert_eq!(last_record(&v), Some(json!(99)));
    }

    #[test]
    fn pet_weight_takes_the_newest_measured_occupancy() {
        let state = json!({});
        let empty = json!({});
        let records = json!([
            { "eventType": 10, "content": { "petWeight": 4000 } },
            { "eventType": 10, "content": { "petWeight": 4150 } },
            { "eventType": 10, "content": {} },
            { "eventType": 5, "content": { "petWeight": 9999 } },
        ]);
        let v = view(&state, &empty, &records);
        // Newest occupancy with content wins; the later empty-content
        // occupancy and the cleanup event are skipped.
        assert_eq!(pet_weight(&v), Some(json!(4150)));
    }

    #[test]
    fn weight_lookup_ignores_events_after_the_occupancy() {
        let state = json!({});
        let empty = json!({});
        let records = json!([
            { "eventType": 5 },
            { "eventType": 10, "content": { "petWeight": 120 } },
            { "eventType": 6 },
        ]);
        let v = view(&state, &empty, &records);
        assert_eq!(last_record(&v), Some(json!("dumped")));
        assert_eq!(pet_weight(&v), Some(json!(120)));
    }

    #[test]
    fn pet_weight_is_null_without_occupancy_events() {
        let state = json!({});
        let empty = json!({});
        let records = json!([{ "eventType": 5 }]);
        let v = view(&state, &empty, &records);
        assert_eq!(pet_weight(&v), None);
    }
}
