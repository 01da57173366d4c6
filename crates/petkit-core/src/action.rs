// ── Device actions ──
//
// Actions are plain descriptors, not callables: the host matches on
// what a device supports via [`ActionKind`] and submits an [`Action`]
// with its parameters. `Device::invoke` maps the descriptor onto the
// vendor's control endpoints.
//
// Vendor rejections (non-zero error code) come back as `Ok(false)` --
// the device did not act, but the cycle is healthy. A successful
// control asks the coordinator for an out-of-band refresh so readings
// catch up before the next scheduled poll.

use tracing::{error, info};

use petkit_api::{RequestKind, response};

use crate::device::{Device, DeviceKind, day_stamp, supported_actions, work_mode_code};
use crate::error::CoreError;

/// Litter-box maintenance commands.
///
/// `Pause`, `Continue` and `End` act on whatever maintenance run is in
/// progress; the control payload carries the current work mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitterCommand {
    Cleanup,
    Deodorize,
    Maintain,
    Pause,
    Continue,
    End,
}

/// A requested device action with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Dispense food now. `None` uses the configured hopper amount.
    FeedNow { amount: Option<u32> },
    /// Dispense from both hoppers of a dual feeder.
    FeedNowDual {
        amount1: Option<u32>,
        amount2: Option<u32>,
    },
    /// Turn a litter box on or off.
    SetPower { on: bool },
    /// Lock or unlock a litter box's manual controls.
    SetManualLock { on: bool },
    /// Run a litter-box maintenance command.
    Litter(LitterCommand),
}

/// The kind of an [`Action`], without its parameters. Used to describe
/// what a device variant supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    FeedNow,
    FeedNowDual,
    SetPower,
    SetManualLock,
    Cleanup,
    Deodorize,
    Maintain,
    Pause,
    Continue,
    End,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::FeedNow { .. } => ActionKind::FeedNow,
            Self::FeedNowDual { .. } => ActionKind::FeedNowDual,
            Self::SetPower { .. } => ActionKind::SetPower,
            Self::SetManualLock { .. } => ActionKind::SetManualLock,
            Self::Litter(LitterCommand::Cleanup) => ActionKind::Cleanup,
            Self::Litter(LitterCommand::Deodorize) => ActionKind::Deodorize,
            Self::Litter(LitterCommand::Maintain) => ActionKind::Maintain,
            Self::Litter(LitterCommand::Pause) => ActionKind::Pause,
            Self::Litter(LitterCommand::Continue) => ActionKind::Continue,
            Self::Litter(LitterCommand::End) => ActionKind::End,
        }
    }
}

impl Device {
    /// Action kinds this device's variant supports.
    pub fn actions(&self) -> &'static [ActionKind] {
        supported_actions(self.kind())
    }

    /// Submit an action to the device.
    ///
    /// `Ok(true)` means the vendor accepted the control and a forced
    /// refresh was requested; `Ok(false)` means the vendor rejected it.
    /// Unsupported actions fail before any request is made.
    pub async fn invoke(&self, action: Action) -> Result<bool, CoreError> {
        let kind = action.kind();
        if !self.actions().contains(&kind) {
            return Err(CoreError::UnsupportedAction {
                kind: self.kind(),
                action: kind,
            });
        }

        match action {
            Action::FeedNow { amount } => {
                let params = [
                    ("deviceId", self.id().to_string()),
                    ("day", day_stamp()),
                    ("time", "-1".to_owned()),
                    (
                        "amount",
                        amount.unwrap_or_else(|| self.feed_now_amount(0)).to_string(),
                    ),
                ];
                self.send_command(&self.feed_now_endpoint(), &params).await
            }
            Action::FeedNowDual { amount1, amount2 } => {
                let params = [
                    ("deviceId", self.id().to_string()),
                    ("day", day_stamp()),
                    ("time", "-1".to_owned()),
                    (
                        "amount1",
                        amount1
                            .unwrap_or_else(|| self.feed_now_amount(0))
                            .to_string(),
                    ),
                    (
                        "amount2",
                        amount2
                            .unwrap_or_else(|| self.feed_now_amount(1))
                            .to_string(),
                    ),
                ];
                self.send_command(&self.feed_now_endpoint(), &params).await
            }
            Action::SetPower { on } => {
                let kv = format!("{{\"power_action\":{}}}", i32::from(on));
                self.control("controlDevice", Some("power"), kv).await
            }
            Action::SetManualLock { on } => {
                let kv = format!("{{\"manualLock\":{}}}", i32::from(on));
                self.control("updateSettings", None, kv).await
            }
            Action::Litter(command) => {
                let (act, value) = self.litter_control(command);
                let kv = format!("{{\"{act}_action\":{value}}}");
                self.control("controlDevice", Some(act), kv).await
            }
        }
    }

    /// First-generation feeders keep the legacy underscore spelling.
    fn feed_now_endpoint(&self) -> String {
        let api = match self.kind() {
            DeviceKind::Feeder | DeviceKind::FeederMini => "save_DailyFeed",
            _ => "saveDailyFeed",
        };
        format!("{}/{api}", self.device_type())
    }

    /// Verb and payload value for a litter command. Pause, continue and
    /// end steer the maintenance run currently reported in the status.
    fn litter_control(&self, command: LitterCommand) -> (&'static str, i64) {
        match command {
            LitterCommand::Cleanup => ("start", 0),
            LitterCommand::Deodorize => ("start", 2),
            LitterCommand::Maintain => ("start", 9),
            LitterCommand::Pause => ("stop", work_mode_code(&self.state())),
            LitterCommand::Continue => ("continue", work_mode_code(&self.state())),
            LitterCommand::End => ("end", work_mode_code(&self.state())),
        }
    }

    /// `{type}/{api}?id=&type=&kv=` control call.
    async fn control(
        &self,
        api: &str,
        control_type: Option<&'static str>,
        kv: String,
    ) -> Result<bool, CoreError> {
        let endpoint = format!("{}/{api}", self.device_type());
        let mut params = vec![("id", self.id().to_string())];
        if let Some(t) = control_type {
            params.push(("type", t.to_owned()));
        }
        params.push(("kv", kv));
        self.send_command(&endpoint, &params).await
    }

    /// One command round trip with vendor-error handling.
    async fn send_command(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<bool, CoreError> {
        let body = self
            .account()
            .request(endpoint, params, RequestKind::Get)
            .await?;

        let code = response::error_code(&body);
        if code != 0 {
            error!(
                device = %self.name(),
                endpoint,
                code,
                message = %response::error_message(&body),
                "device control rejected"
            );
            return Ok(false);
        }

        info!(device = %self.name(), endpoint, "device control accepted");
        self.request_refresh();
        Ok(true)
    }
}
