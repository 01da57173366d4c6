// Activity-tracker readings (Fit).
//
// The tracker's detail comes from the per-day `deviceAllData` endpoint;
// each record block carries a `total` for the day. Its `state` reading
// replaces the base one with the last sync time.

use serde_json::Value;

use super::{DeviceView, ReadingFn};

pub(super) fn entries() -> Vec<(&'static str, ReadingFn)> {
    vec![
        ("state", sync_time),
        ("activity", activity),
        ("calorie", calorie),
        ("sleep", sleep),
    ]
}

fn sync_time(view: &DeviceView<'_>) -> Option<Value> {
    view.state.get("syncTime").cloned()
}

fn day_total<'a>(view: &DeviceView<'a>, block: &str) -> Option<&'a Value> {
    view.detail.get(block)?.get("total")
}

fn activity(view: &DeviceView<'_>) -> Option<Value> {
    day_total(view, "activityRecord").cloned()
}

fn calorie(view: &DeviceView<'_>) -> Option<Value> {
    day_total(view, "calorieRecord").cloned()
}

fn sleep(view: &DeviceView<'_>) -> Option<Value> {
    day_total(view, "sleepDetail").cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_totals_from_the_all_data_blob() {
        let state = json!({ "syncTime": "2023-04-02 08:15:00" });
        let detail = json!({
            "activityRecord": { "total": 5200 },
            "calorieRecord": { "total": 143 },
            "sleepDetail": { "total": 31000 },
        });
        let records = json!([]);
        let v = DeviceView {
            state: &state,
            detail: &detail,
            records: &records,
        };

        assert_eq!(sync_time(&v), Some(json!("2023-04-02 08:15:00")));
        assert_eq!(activity(&v), Some(json!(5200)));
        assert_eq!(calorie(&v), Some(json!(143)));
        assert_eq!(sleep(&v), Some(json!(31000)));
    }

    #[test]
    fn missing_blocks_read_as_absent() {
        let state = json!({});
        let detail = json!({});
        let records = json!([]);
        let v = DeviceView {
            state: &state,
            detail: &detail,
            records: &records,
        };
        assert_eq!(sync_time(&v), None);
        assert_eq!(activity(&v), None);
    }
}
