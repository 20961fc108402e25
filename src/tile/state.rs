use std::fmt;

use crate::network::{CellularDisplayInfo, SignalLevel, Transport};
use crate::platform::GroundTruth;
use crate::tile::command::Generation;

/// Ground truth plus optimistic intent for one transport
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportState {
    pub enabled: bool,
    pub pending_enable: bool,
}

impl TransportState {
    pub fn active(self) -> bool {
        self.enabled || self.pending_enable
    }
}

/// Identity of the Wi-Fi network shown on the tile
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct WifiIdentity {
    pub ssid: Option<String>,
    pub connected: bool,
}

impl WifiIdentity {
    /// The SSID only counts while the link is actually up
    pub fn connected_ssid(&self) -> Option<&str> {
        match self.connected {
            true => self.ssid.as_deref(),
            false => None,
        }
    }
}

/// Everything needed to render the tile
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub wifi: TransportState,
    pub cellular: TransportState,
    pub wifi_identity: WifiIdentity,
    pub wifi_signal: Option<SignalLevel>,
    pub cellular_display: CellularDisplayInfo,
    pub generation: Generation,
}

impl ControllerSnapshot {
    pub fn transport(&self, transport: Transport) -> TransportState {
        match transport {
            Transport::Wifi => self.wifi,
            Transport::Cellular => self.cellular,
        }
    }

    pub fn ground_truth(&self) -> GroundTruth {
        GroundTruth::new(self.wifi.enabled, self.cellular.enabled)
    }

    pub fn mode(&self) -> Mode {
        if self.cellular.pending_enable {
            Mode::SwitchingToData
        } else if self.wifi.pending_enable {
            Mode::SwitchingToWifi
        } else if self.wifi.enabled {
            Mode::IdleWifiOn
        } else if self.cellular.enabled {
            Mode::IdleDataOn
        } else {
            Mode::IdleNone
        }
    }

    /// The transport the tile presents as in use, if any
    pub fn displayed_transport(&self) -> Option<Transport> {
        if self.wifi.active() && !self.cellular.pending_enable {
            Some(Transport::Wifi)
        } else if self.cellular.active() {
            Some(Transport::Cellular)
        } else {
            None
        }
    }
}

/// Combined controller state derived from both transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    IdleWifiOn,
    IdleDataOn,
    IdleNone,
    SwitchingToData,
    SwitchingToWifi,
}

impl Mode {
    pub fn is_switching(self) -> bool {
        matches!(self, Mode::SwitchingToData | Mode::SwitchingToWifi)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::IdleWifiOn => "idle (Wi-Fi on)",
            Mode::IdleDataOn => "idle (data on)",
            Mode::IdleNone => "idle (offline)",
            Mode::SwitchingToData => "switching to data",
            Mode::SwitchingToWifi => "switching to Wi-Fi",
        };
        f.write_str(name)
    }
}
