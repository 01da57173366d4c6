// Feeder-family readings.
//
// Feeders report a `status` block inside the roster state and a
// `state.feedState` block inside the fetched detail. The Infinity (d3)
// and Gemini (d4s) models reshape two of the fields; those variants
// override the family entry by name.

use serde_json::{Value, json};

use super::{DeviceView, ReadingFn};

pub(super) fn entries() -> Vec<(&'static str, ReadingFn)> {
    vec![
        ("desiccant", desiccant),
        ("food_low", food_low),
        ("food_state_attrs", food_state_attrs),
        ("feed_times", feed_times),
        ("feed_amount", feed_amount),
        ("eat_amount", eat_amount),
        ("eat_times", eat_times),
        ("bowl_weight", bowl_weight),
    ]
}

/// Infinity counts scheduled feeds as a list, not a counter.
pub(super) fn d3_overrides() -> Vec<(&'static str, ReadingFn)> {
    vec![("feed_times", feed_times_from_list)]
}

/// Gemini reports dispensed grams per hopper.
pub(super) fn d4s_overrides() -> Vec<(&'static str, ReadingFn)> {
    vec![("feed_amount", feed_amount_dual)]
}

fn status<'a>(view: &DeviceView<'a>) -> Option<&'a Value> {
    view.state.get("status")
}

fn feed_state<'a>(view: &DeviceView<'a>) -> Option<&'a Value> {
    view.detail.get("state")?.get("feedState")
}

/// Days of desiccant life left.
fn desiccant(view: &DeviceView<'_>) -> Option<Value> {
    let days = status(view)?
        .get("desiccantLeftDays")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(days))
}

/// `status.food` is 1 while the hopper has food; 0 means low.
fn food_low(view: &DeviceView<'_>) -> Option<Value> {
    let food = status(view)?.get("food").and_then(Value::as_i64).unwrap_or(0);
    Some(json!(food == 0))
}

/// Bundle behind the food-level reading: raw code plus a description.
fn food_state_attrs(view: &DeviceView<'_>) -> Option<Value> {
    let status = status(view)?;
    let low = status.get("food").and_then(Value::as_i64).unwrap_or(0) == 0;
    Some(json!({
        "state": status.get("food"),
        "desc": if low { "low" } else { "normal" },
    }))
}

fn feed_times(view: &DeviceView<'_>) -> Option<Value> {
    let times = feed_state(view)?
        .get("times")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(times))
}

fn feed_times_from_list(view: &DeviceView<'_>) -> Option<Value> {
    let count = feed_state(view)?
        .get("feedTimes")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    Some(json!(count))
}

/// Grams dispensed today.
fn feed_amount(view: &DeviceView<'_>) -> Option<Value> {
    let grams = feed_state(view)?
        .get("realAmountTotal")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(grams))
}

fn feed_amount_dual(view: &DeviceView<'_>) -> Option<Value> {
    let feed_state = feed_state(view)?;
    let hopper1 = feed_state
        .get("realAmountTotal1")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let hopper2 = feed_state
        .get("realAmountTotal2")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(hopper1 + hopper2))
}

/// Grams eaten today.
fn eat_amount(view: &DeviceView<'_>) -> Option<Value> {
    let grams = feed_state(view)?
        .get("eatAmountTotal")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(grams))
}

fn eat_times(view: &DeviceView<'_>) -> Option<Value> {
    let count = feed_state(view)?
        .get("eatTimes")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    Some(json!(count))
}

/// Current bowl weight (grams), where the model has a scale. Lives in
/// the live status block, not the fetched detail.
fn bowl_weight(view: &DeviceView<'_>) -> Option<Value> {
    let grams = status(view)?
        .get("weight")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    Some(json!(grams))
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
    fn readings_from_a_full_detail_blob() {
        let state = json!({
            "status": { "desiccantLeftDays": 12, "food": 1, "weight": 18 }
        });
        let detail = json!({
            "state": {
                "feedState": {
                    "times": 3,
                    "realAmountTotal": 60,
                    "eatAmountTotal": 45,
                    "eatTimes": [180, 420, 660],
                }
            }
        });
        let empty = json!([]);
        let v = view(&state, &detail, &empty);

        assert_eq!(desiccant(&v), Some(json!(12)));
        assert_eq!(food_low(&v), Some(json!(false)));
        assert_eq!(feed_times(&v), Some(json!(3)));
        assert_eq!(feed_amount(&v), Some(json!(60)));
        assert_eq!(eat_amount(&v), Some(json!(45)));
        assert_eq!(eat_times(&v), Some(json!(3)));
        assert_eq!(bowl_weight(&v), Some(json!(18)));
    }

    #[test]
    fn missing_blocks_degrade_to_zero_or_none() {
        let state = json!({});
        let detail = json!({});
        let empty = json!([]);
        let v = view(&state, &detail, &empty);

        // No status block at all: the reading itself is absent.
        assert_eq!(desiccant(&v), None);
        assert_eq!(feed_times(&v), None);

        // Status present but sparse: fields default to zero.
        let sparse = json!({ "status": {} });
        let v = view(&sparse, &detail, &empty);
        assert_eq!(desiccant(&v), Some(json!(0)));
        assert_eq!(food_low(&v), Some(json!(true)));
    }

    #[test]
    fn food_state_attrs_describe_the_level() {
        let detail = json!({});
        let empty = json!([]);

        let full = json!({ "status": { "food": 1 } });
        let v = view(&full, &detail, &empty);
        assert_eq!(
            food_state_attrs(&v),
            Some(json!({ "state": 1, "desc": "normal" }))
        );

        let low = json!({ "status": { "food": 0 } });
        let v = view(&low, &detail, &empty);
        assert_eq!(
            food_state_attrs(&v),
            Some(json!({ "state": 0, "desc": "low" }))
        );
    }

    #[test]
    fn bowl_weight_comes_from_the_status_block() {
        // The scale reports through the roster status; no detail fetch
        // is needed for this reading.
        let state = json!({ "status": { "weight": 18 } });
        let detail = json!({});
        let empty = json!([]);
        let v = view(&state, &detail, &empty);
        assert_eq!(bowl_weight(&v), Some(json!(18)));

        let stale_detail = json!({ "state": { "feedState": { "weight": 99 } } });
        let v = view(&state, &stale_detail, &empty);
        assert_eq!(bowl_weight(&v), Some(json!(18)));
    }

    #[test]
    fn infinity_counts_feeds_from_the_schedule_list() {
        let state = json!({});
        let detail = json!({
            "state": { "feedState": { "feedTimes": [1, 2, 3, 4], "times": 99 } }
        });
        let empty = json!([]);
        let v = view(&state, &detail, &empty);
        assert_eq!(feed_times_from_list(&v), Some(json!(4)));
    }

    #[test]
    fn gemini_sums_both_hoppers() {
        let state = json!({});
        let detail = json!({
            "state": { "feedState": { "realAmountTotal1": 20, "realAmountTotal2": 15 } }
        });
        let empty = json!([]);
        let v = view(&state, &detail, &empty);
        assert_eq!(feed_amount_dual(&v), Some(json!(35)));
    }
}
