// Water-fountain readings (Eversweet).
//
// The fountain reports warnings and run state in its `status` block,
// and filter life at the top level of the roster blob. Its `state`
// reading replaces the base one: warnings beat run state.

use serde_json::{Value, json};

use super::{DeviceView, ReadingFn};

pub(super) fn entries() -> Vec<(&'static str, ReadingFn)> {
    vec![
        ("state", fountain_state),
        ("filter_level", filter_level),
        ("filter_days", filter_days),
    ]
}

fn truthy(status: &Value, key: &str) -> bool {
    status.get(key).and_then(Value::as_i64).unwrap_or(0) != 0
}

fn fountain_state(view: &DeviceView<'_>) -> Option<Value> {
    let status = view.state.get("status")?;
    if truthy(status, "lackWarning") {
        return Some(json!("water_lack"));
    }
    if truthy(status, "breakdownWarning") {
        return Some(json!("breakdown"));
    }
    if truthy(status, "runStatus") {
        return Some(json!("working"));
    }
    if truthy(status, "powerStatus") {
        return Some(json!("idle"));
    }
    None
}

/// Remaining filter life (percent).
fn filter_level(view: &DeviceView<'_>) -> Option<Value> {
    view.state.get("filterPercent").cloned()
}

/// Expected days until the filter needs replacing.
fn filter_days(view: &DeviceView<'_>) -> Option<Value> {
    view.state.get("filterExpectedDays").cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view<'a>(state: &'a Value, empty: &'a Value) -> DeviceView<'a> {
        DeviceView {
            state,
            detail: empty,
            records: empty,
        }
    }

    #[test]
    fn warnings_outrank_run_state() {
        let empty = json!({});
        let state = json!({
            "status": {
                "lackWarning": 1,
                "breakdownWarning": 1,
                "runStatus": 1,
                "powerStatus": 1,
            }
        });
        assert_eq!(fountain_state(&view(&state, &empty)), Some(json!("water_lack")));

        let state = json!({ "status": { "breakdownWarning": 1, "runStatus": 1 } });
        assert_eq!(fountain_state(&view(&state, &empty)), Some(json!("breakdown")));

        let state = json!({ "status": { "runStatus": 1, "powerStatus": 1 } });
        assert_eq!(fountain_state(&view(&state, &empty)), Some(json!("working")));

        let state = json!({ "status": { "powerStatus": 1 } });
        assert_eq!(fountain_state(&view(&state, &empty)), Some(json!("idle")));
    }

    #[test]
    fn powered_off_fountain_has_no_state() {
        let empty = json!({});
        let state = json!({ "status": {} });
        assert_eq!(fountain_state(&view(&state, &empty)), None);
    }

    #[test]
    fn filter_readings_come_from_the_roster_blob() {
        let empty = json!({});
        let state = json!({ "filterPercent": 73, "filterExpectedDays": 22 });
        assert_eq!(filter_level(&view(&state, &empty)), Some(json!(73)));
        assert_eq!(filter_days(&view(&state, &empty)), Some(json!(22)));
    }
}
