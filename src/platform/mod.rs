//! Device collaborators the tile depends on.
//!
//! The tile never talks to the OS directly: ground truth, link details and
//! lock state all come through [`Platform`], so the controller can be driven
//! by a real device shell or by the in-process [`SimulatedDevice`].

mod android;
mod simulated;

pub use android::{AndroidPlatform, MobileDataStrategy};
pub use simulated::{DeviceState, SimulatedDevice};

use log::warn;

use crate::error::TileResult;
use crate::network::{CellularLink, SignalLevel, WifiDetail};

/// Wi-Fi link as reported by the platform while the interface is connected
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WifiLink {
    pub ssid: Option<String>,
    pub rssi: Option<i32>,
}

impl WifiLink {
    pub fn detail(&self) -> WifiDetail {
        WifiDetail {
            ssid: self.ssid.clone(),
            signal: self.rssi.map(SignalLevel::from_rssi),
        }
    }
}

pub trait Platform: Send + Sync {
    fn wifi_enabled(&self) -> TileResult<bool>;

    fn mobile_data_enabled(&self) -> TileResult<bool>;

    /// Whether carrier identity may be read (READ_PHONE_STATE on Android)
    fn has_carrier_info_permission(&self) -> bool;

    /// `None` while no Wi-Fi network is reachable
    fn wifi_link(&self) -> TileResult<Option<WifiLink>>;

    /// `None` while no cellular data network is reachable
    fn cellular_link(&self) -> TileResult<Option<CellularLink>>;

    fn is_locked(&self) -> bool;
}

/// OS-reported enabled state of both transports
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroundTruth {
    pub wifi_enabled: bool,
    pub data_enabled: bool,
}

impl GroundTruth {
    pub fn new(wifi_enabled: bool, data_enabled: bool) -> Self {
        Self {
            wifi_enabled,
            data_enabled,
        }
    }

    /// Query both transports. A failed query is treated as "disabled".
    pub fn read(platform: &dyn Platform) -> Self {
        let wifi_enabled = platform.wifi_enabled().unwrap_or_else(|e| {
            warn!("Could not read Wi-Fi state, assuming disabled: {e}");
            false
        });
        let data_enabled = platform.mobile_data_enabled().unwrap_or_else(|e| {
            warn!("Could not read mobile data state, assuming disabled: {e}");
            false
        });
        Self {
            wifi_enabled,
            data_enabled,
        }
    }
}

/// Settings screen opened by a long press on the tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTarget {
    NetworkOperator,
    Wifi,
    Wireless,
}

impl SettingsTarget {
    pub fn for_ground_truth(ground: GroundTruth) -> Self {
        if ground.data_enabled {
            SettingsTarget::NetworkOperator
        } else if ground.wifi_enabled {
            SettingsTarget::Wifi
        } else {
            SettingsTarget::Wireless
        }
    }

    pub fn intent_action(self) -> &'static str {
        match self {
            SettingsTarget::NetworkOperator => "android.settings.NETWORK_OPERATOR_SETTINGS",
            SettingsTarget::Wifi => "android.settings.WIFI_SETTINGS",
            SettingsTarget::Wireless => "android.settings.WIRELESS_SETTINGS",
        }
    }

    pub fn shell_command(self) -> String {
        format!("am start -a {}", self.intent_action())
    }
}
