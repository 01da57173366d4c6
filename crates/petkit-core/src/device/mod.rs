// ── Device capability model ──
//
// One `Device` per roster id, created once and refreshed in place.
// Each device is bound to a variant (`DeviceKind`) chosen from the
// vendor type string at creation; the variant selects a reading table,
// an action set, and a detail-refresh shape. Raw vendor blobs are held
// behind `ArcSwap` and replaced wholesale -- readers never observe a
// half-updated snapshot.

mod base;
mod feeder;
mod fit;
mod litter;
mod water;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::ArcSwap;
use chrono::Local;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use petkit_api::response;
use petkit_api::{Account, Params, RequestKind};

use crate::action::ActionKind;
use crate::error::CoreError;
use crate::model::RosterEntry;

pub(crate) use litter::work_mode_code;

/// A concrete device variant. Closed set: unknown vendor types fall
/// back to [`Generic`](Self::Generic), never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceKind {
    Generic,
    /// First-generation feeder (`feeder`).
    Feeder,
    /// Compact first-generation feeder (`feedermini`).
    FeederMini,
    /// Fresh Element Infinity camera feeder.
    D3,
    /// Fresh Element Solo feeder.
    D4,
    /// Gemini dual-hopper feeder.
    D4s,
    /// Eversweet water fountain.
    W5,
    /// Fit activity tracker.
    P3,
    /// Pura X litter box.
    T3,
    /// Pura Max litter box.
    T4,
}

/// Device family -- selects the detail-refresh shape and action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Generic,
    Feeder,
    Litter,
    Water,
    Fit,
}

impl DeviceKind {
    /// Resolve a vendor type string to a variant. Pure and
    /// deterministic; case-insensitive; unknown strings yield
    /// [`Generic`](Self::Generic).
    pub fn from_type_str(device_type: &str) -> Self {
        match device_type.to_lowercase().as_str() {
            "feeder" => Self::Feeder,
            "feedermini" => Self::FeederMini,
            "d3" => Self::D3,
            "d4" => Self::D4,
            "d4s" => Self::D4s,
            "w5" => Self::W5,
            "p3" => Self::P3,
            "t3" => Self::T3,
            "t4" => Self::T4,
            _ => Self::Generic,
        }
    }

    pub fn family(self) -> Family {
        match self {
            Self::Generic => Family::Generic,
            Self::Feeder | Self::FeederMini | Self::D3 | Self::D4 | Self::D4s => Family::Feeder,
            Self::T3 | Self::T4 => Family::Litter,
            Self::W5 => Family::Water,
            Self::P3 => Family::Fit,
        }
    }
}

/// A borrowed view over a device's current snapshots, handed to
/// reading functions. Pure derivation: no I/O, no caching.
pub(crate) struct DeviceView<'a> {
    pub state: &'a Value,
    pub detail: &'a Value,
    pub records: &'a Value,
}

/// A derived reading: a pure function of the snapshot at read time.
pub(crate) type ReadingFn = fn(&DeviceView<'_>) -> Option<Value>;

/// Fallback grams dispensed when no feed amount has been configured.
const DEFAULT_FEED_AMOUNT: u32 = 10;

/// One smart appliance, bound to a variant for its whole lifetime.
pub struct Device {
    id: i64,
    kind: DeviceKind,
    device_type: String,
    name: String,
    account: Arc<Account>,
    state: ArcSwap<Value>,
    detail: ArcSwap<Value>,
    records: ArcSwap<Value>,
    /// Host-configurable feed-now hopper amounts (grams).
    feed_amounts: [AtomicU32; 2],
    readings: IndexMap<&'static str, ReadingFn>,
    refresh_tx: mpsc::Sender<i64>,
}

impl Device {
    pub(crate) fn new(
        entry: RosterEntry,
        account: Arc<Account>,
        refresh_tx: mpsc::Sender<i64>,
    ) -> Self {
        let kind = DeviceKind::from_type_str(&entry.device_type);
        let readings = build_readings(kind, &entry.raw);
        Self {
            id: entry.id,
            kind,
            device_type: entry.device_type,
            name: entry.name,
            account,
            state: ArcSwap::from_pointee(entry.raw),
            detail: ArcSwap::from_pointee(Value::Object(serde_json::Map::new())),
            records: ArcSwap::from_pointee(Value::Array(Vec::new())),
            feed_amounts: [
                AtomicU32::new(DEFAULT_FEED_AMOUNT),
                AtomicU32::new(DEFAULT_FEED_AMOUNT),
            ],
            readings,
            refresh_tx,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// The lowercased vendor type string (selects endpoint paths).
    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn account(&self) -> &Account {
        &self.account
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Replace the state snapshot wholesale (reconciliation engine,
    /// once per poll).
    pub(crate) fn replace_state(&self, state: Value) {
        self.state.store(Arc::new(state));
    }

    /// The current raw state blob.
    pub fn state(&self) -> Arc<Value> {
        self.state.load_full()
    }

    /// The current raw detail blob.
    pub fn detail(&self) -> Arc<Value> {
        self.detail.load_full()
    }

    // ── Readings ─────────────────────────────────────────────────────

    /// Names of every reading this variant exposes, in table order.
    pub fn reading_names(&self) -> Vec<&'static str> {
        self.readings.keys().copied().collect()
    }

    /// Whether this variant exposes a reading with this name.
    pub fn has_reading(&self, name: &str) -> bool {
        self.readings.contains_key(name)
    }

    /// Evaluate one reading against the current snapshots.
    ///
    /// `None` means "no such reading on this variant"; a present
    /// reading with no data yet evaluates to `Value::Null`.
    pub fn reading(&self, name: &str) -> Option<Value> {
        let f = self.readings.get(name)?;
        let state = self.state.load_full();
        let detail = self.detail.load_full();
        let records = self.records.load_full();
        let view = DeviceView {
            state: state.as_ref(),
            detail: detail.as_ref(),
            records: records.as_ref(),
        };
        Some(f(&view).unwrap_or(Value::Null))
    }

    /// Evaluate the full reading table against the current snapshots.
    pub fn readings(&self) -> IndexMap<&'static str, Value> {
        let state = self.state.load_full();
        let detail = self.detail.load_full();
        let records = self.records.load_full();
        let view = DeviceView {
            state: state.as_ref(),
            detail: detail.as_ref(),
            records: records.as_ref(),
        };
        self.readings
            .iter()
            .map(|(name, f)| (*name, f(&view).unwrap_or(Value::Null)))
            .collect()
    }

    // ── Feed-now configuration ───────────────────────────────────────

    /// The configured feed-now amount (grams) for a hopper (0 or 1).
    pub fn feed_now_amount(&self, hopper: usize) -> u32 {
        self.feed_amounts[hopper.min(1)].load(Ordering::Relaxed)
    }

    /// Set the feed-now amount (grams) for a hopper (0 or 1). The host
    /// wires this to its number input.
    pub fn set_feed_now_amount(&self, hopper: usize, grams: u32) {
        self.feed_amounts[hopper.min(1)].store(grams, Ordering::Relaxed);
    }

    // ── Detail refresh ───────────────────────────────────────────────

    /// Fetch this variant's detail endpoint(s) and replace the detail
    /// blob(s) wholesale.
    ///
    /// Transport and decode failures leave the previous blob in place
    /// and log a warning; only authentication failures propagate, so
    /// the coordinator can surface the re-auth condition.
    pub async fn refresh_detail(&self) -> Result<(), CoreError> {
        match self.kind.family() {
            Family::Fit => self.fetch_all_data().await,
            Family::Litter => {
                self.fetch_detail().await?;
                self.fetch_records().await
            }
            Family::Generic | Family::Feeder | Family::Water => self.fetch_detail().await,
        }
    }

    /// `GET {type}/device_detail?id=` -> detail blob.
    async fn fetch_detail(&self) -> Result<(), CoreError> {
        let endpoint = format!("{}/device_detail", self.device_type);
        let params = [("id", self.id.to_string())];
        if let Some(result) = self.fetch(&endpoint, &params).await? {
            self.detail.store(Arc::new(result));
        }
        Ok(())
    }

    /// `GET {type}/getDeviceRecord?deviceId=` -> event records.
    /// Pura Max wants an explicit date.
    async fn fetch_records(&self) -> Result<(), CoreError> {
        let endpoint = format!("{}/getDeviceRecord", self.device_type);
        let mut params = vec![("deviceId", self.id.to_string())];
        if self.kind == DeviceKind::T4 {
            params.push(("date", day_stamp()));
        }
        if let Some(result) = self.fetch(&endpoint, &params).await? {
            self.records.store(Arc::new(result));
        }
        Ok(())
    }

    /// `GET {type}/deviceAllData?deviceId=&day=` -> per-day detail.
    async fn fetch_all_data(&self) -> Result<(), CoreError> {
        let endpoint = format!("{}/deviceAllData", self.device_type);
        let params = [("deviceId", self.id.to_string()), ("day", day_stamp())];
        if let Some(result) = self.fetch(&endpoint, &params).await? {
            self.detail.store(Arc::new(result));
        }
        Ok(())
    }

    /// One detail fetch. `Ok(None)` means "no usable data this cycle";
    /// the caller keeps the previous blob.
    async fn fetch(&self, endpoint: &str, params: &Params) -> Result<Option<Value>, CoreError> {
        let body = match self.account.request(endpoint, params, RequestKind::Get).await {
            Ok(body) => body,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                warn!(device = %self.name, endpoint, error = %e, "detail fetch failed");
                return Ok(None);
            }
        };

        let result = response::result(&body)
            .filter(|r| !is_empty_payload(r))
            .cloned();
        if result.is_none() {
            warn!(
                device = %self.name,
                endpoint,
                body = %body,
                "detail fetch returned no data; keeping previous snapshot"
            );
        }
        Ok(result)
    }

    /// Ask the coordinator for an out-of-band refresh (after a
    /// successful action). Local state is never mutated here.
    pub(crate) fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(self.id);
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("type", &self.device_type)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Today as the vendor's `YYYYMMDD` day parameter.
pub(crate) fn day_stamp() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Null, `{}`, and `[]` all count as "no data".
pub(crate) fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Build the reading table for a variant: base entries, then family
/// entries, then model overrides. Later layers replace earlier entries
/// by name, preserving first-insertion order.
fn build_readings(kind: DeviceKind, state: &Value) -> IndexMap<&'static str, ReadingFn> {
    let mut table: IndexMap<&'static str, ReadingFn> = IndexMap::new();
    for (name, f) in base::entries(state) {
        table.insert(name, f);
    }

    let family_entries = match kind.family() {
        Family::Feeder => feeder::entries(),
        Family::Litter => litter::entries(),
        Family::Water => water::entries(),
        Family::Fit => fit::entries(),
        Family::Generic => Vec::new(),
    };
    for (name, f) in family_entries {
        table.insert(name, f);
    }

    let model_entries = match kind {
        DeviceKind::D3 => feeder::d3_overrides(),
        DeviceKind::D4s => feeder::d4s_overrides(),
        _ => Vec::new(),
    };
    for (name, f) in model_entries {
        table.insert(name, f);
    }

    table
}

/// List of action kinds a variant supports, fixed at construction.
pub(crate) fn supported_actions(kind: DeviceKind) -> &'static [ActionKind] {
    match kind {
        DeviceKind::Feeder | DeviceKind::FeederMini | DeviceKind::D3 | DeviceKind::D4 => {
            &[ActionKind::FeedNow]
        }
        DeviceKind::D4s => &[ActionKind::FeedNowDual],
        DeviceKind::T3 | DeviceKind::T4 => &[
            ActionKind::SetPower,
            ActionKind::SetManualLock,
            ActionKind::Cleanup,
            ActionKind::Deodorize,
            ActionKind::Maintain,
            ActionKind::Pause,
            ActionKind::Continue,
            ActionKind::End,
        ],
        DeviceKind::Generic | DeviceKind::W5 | DeviceKind::P3 => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_device(raw: Value) -> Device {
        let entry = RosterEntry::from_raw(&raw).expect("roster entry");
        let account = Arc::new(Account::new(
            reqwest::Client::new(),
            petkit_api::Credentials::new(
                "t@example.com",
                secrecy::SecretString::from("pw".to_owned()),
                petkit_api::Region::UnitedStates,
            ),
        ));
        let (tx, _rx) = mpsc::channel(4);
        Device::new(entry, account, tx)
    }

    #[test]
    fn variant_resolution_is_deterministic() {
        for (raw, expected) in [
            ("feeder", DeviceKind::Feeder),
            ("feedermini", DeviceKind::FeederMini),
            ("d3", DeviceKind::D3),
            ("D4", DeviceKind::D4),
            ("d4s", DeviceKind::D4s),
            ("w5", DeviceKind::W5),
            ("p3", DeviceKind::P3),
            ("t3", DeviceKind::T3),
            ("T4", DeviceKind::T4),
        ] {
            assert_eq!(DeviceKind::from_type_str(raw), expected);
            assert_eq!(
                DeviceKind::from_type_str(raw),
                DeviceKind::from_type_str(raw)
            );
        }
    }

    #[test]
    fn unknown_types_fall_back_to_generic() {
        assert_eq!(DeviceKind::from_type_str("z9"), DeviceKind::Generic);
        assert_eq!(DeviceKind::from_type_str(""), DeviceKind::Generic);
        assert_eq!(
            supported_actions(DeviceKind::Generic),
            &[] as &[ActionKind]
        );
    }

    #[test]
    fn battery_reading_follows_construction_state() {
        let with_battery = test_device(json!({ "id": 1, "type": "d4", "state": 1, "battery": 4 }));
        assert!(with_battery.has_reading("battery"));
        assert_eq!(with_battery.reading("battery"), Some(json!(4)));

        let without = test_device(json!({ "id": 2, "type": "d4", "state": 1 }));
        assert!(!without.has_reading("battery"));
        assert_eq!(without.reading("battery"), None);
    }

    #[test]
    fn state_replacement_feeds_readings() {
        let device = test_device(json!({ "id": 1, "type": "d4", "state": 1 }));
        assert_eq!(device.reading("state"), Some(json!("online")));

        device.replace_state(json!({ "id": 1, "type": "d4", "state": 2 }));
        assert_eq!(device.reading("state"), Some(json!("offline")));
    }

    #[test]
    fn empty_payload_detection() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&json!([])));
        assert!(!is_empty_payload(&json!({ "a": 1 })));
        assert!(!is_empty_payload(&json!(0)));
    }
}
