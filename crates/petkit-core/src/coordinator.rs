// ── Polling coordinator ──
//
// Owns the account client and the device set for one PetKit account.
// The host drives it: call [`Coordinator::update`] on its schedule and
// read devices between polls. One cycle = roster fetch, state
// reconciliation, then a sequential detail refresh per device.
//
// Devices are created once, on the first successful cycle, and live
// for the coordinator's lifetime. A device that drops off the roster
// keeps its last state; a device that appears later is logged but not
// adopted mid-flight -- the roster cache lets the host decide to
// rebuild.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use petkit_api::Account;

use crate::config::AccountConfig;
use crate::device::Device;
use crate::error::CoreError;
use crate::model::RosterEntry;

/// Capacity of the forced-refresh queue. Device controls are rare;
/// dropped requests only delay a refresh to the next scheduled poll.
const REFRESH_QUEUE_CAPACITY: usize = 16;

/// Polling coordinator for one PetKit account. Cheap to clone.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    account: Arc<Account>,
    config: AccountConfig,
    devices: DashMap<i64, Arc<Device>>,
    roster: ArcSwap<Vec<RosterEntry>>,
    initialized: AtomicBool,
    refresh_tx: mpsc::Sender<i64>,
    refresh_rx: Mutex<Option<mpsc::Receiver<i64>>>,
}

impl Coordinator {
    /// Build a coordinator from host configuration.
    pub fn new(config: AccountConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Config {
                message: format!("HTTP client: {e}"),
            })?;
        let account = Arc::new(Account::new(http, config.credentials()));
        Ok(Self::with_account(account, config))
    }

    /// Build a coordinator around an existing account client. Used by
    /// tests and by hosts that share one client across coordinators.
    pub fn with_account(account: Arc<Account>, config: AccountConfig) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_QUEUE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                account,
                config,
                devices: DashMap::new(),
                roster: ArcSwap::from_pointee(Vec::new()),
                initialized: AtomicBool::new(false),
                refresh_tx,
                refresh_rx: Mutex::new(Some(refresh_rx)),
            }),
        }
    }

    /// The account client this coordinator polls with.
    pub fn account(&self) -> &Arc<Account> {
        &self.inner.account
    }

    /// How often the host should call [`update`](Self::update).
    pub fn poll_interval(&self) -> std::time::Duration {
        self.inner.config.poll_interval
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Run one poll cycle under the configured time budget.
    ///
    /// Auth failures and roster-level vendor errors fail the cycle;
    /// per-device detail problems are isolated and logged, never fatal.
    pub async fn update(&self) -> Result<(), CoreError> {
        let timeout = self.inner.config.timeout;
        tokio::time::timeout(timeout, self.run_cycle())
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            })?
    }

    async fn run_cycle(&self) -> Result<(), CoreError> {
        let raw_roster = self.inner.account.device_roster().await?;
        let entries: Vec<RosterEntry> = raw_roster
            .iter()
            .filter_map(RosterEntry::from_raw)
            .collect();
        debug!(devices = entries.len(), "device roster fetched");

        self.reconcile(&entries);
        self.inner.roster.store(Arc::new(entries));

        for device in self.devices() {
            device.refresh_detail().await?;
        }
        Ok(())
    }

    /// Fold a fresh roster into the device set. First cycle builds the
    /// set; later cycles replace state wholesale on known devices.
    fn reconcile(&self, entries: &[RosterEntry]) {
        if !self.inner.initialized.swap(true, Ordering::AcqRel) {
            for entry in entries {
                let device = Arc::new(Device::new(
                    entry.clone(),
                    Arc::clone(&self.inner.account),
                    self.inner.refresh_tx.clone(),
                ));
                info!(
                    id = device.id(),
                    kind = %device.kind(),
                    name = device.name(),
                    "device adopted"
                );
                self.inner.devices.insert(device.id(), device);
            }
            return;
        }

        for entry in entries {
            match self.inner.devices.get(&entry.id) {
                Some(device) => device.replace_state(entry.raw.clone()),
                None => info!(
                    id = entry.id,
                    device_type = %entry.device_type,
                    "new device on roster; not adopted until rebuild"
                ),
            }
        }

        let roster_ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        for device in self.inner.devices.iter() {
            if !roster_ids.contains(&device.id()) {
                warn!(
                    id = device.id(),
                    name = device.name(),
                    "device missing from roster; keeping last known state"
                );
            }
        }
    }

    // ── Device access ────────────────────────────────────────────────

    /// All known devices, unordered.
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.inner
            .devices
            .iter()
            .map(|d| Arc::clone(d.value()))
            .collect()
    }

    /// Look up one device by roster id.
    pub fn device(&self, id: i64) -> Result<Arc<Device>, CoreError> {
        self.inner
            .devices
            .get(&id)
            .map(|d| Arc::clone(d.value()))
            .ok_or(CoreError::DeviceNotFound { id })
    }

    /// The most recent roster snapshot.
    pub fn roster(&self) -> Arc<Vec<RosterEntry>> {
        self.inner.roster.load_full()
    }

    /// Take the forced-refresh queue. Successful device controls push
    /// their device id here; the host drains it and calls
    /// [`update`](Self::update) out of band. Callable once.
    pub async fn forced_refreshes(&self) -> Option<mpsc::Receiver<i64>> {
        self.inner.refresh_rx.lock().await.take()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("devices", &self.inner.devices.len())
            .field("initialized", &self.inner.initialized.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
