use std::fmt;

use crate::network::cellular::RadioGeneration;

/// A connectivity medium the tile can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Wifi,
    Cellular,
}

impl Transport {
    pub fn other(self) -> Transport {
        match self {
            Transport::Wifi => Transport::Cellular,
            Transport::Cellular => Transport::Wifi,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Wifi => write!(f, "Wi-Fi"),
            Transport::Cellular => write!(f, "cellular"),
        }
    }
}

/// Signal strength bucket used for icons, `0..=4`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalLevel(u8);

impl SignalLevel {
    pub const MAX: u8 = 4;

    const MIN_RSSI: i32 = -100;
    const MAX_RSSI: i32 = -55;

    pub fn new(level: u8) -> Self {
        SignalLevel(level.min(Self::MAX))
    }

    /// Bucket a Wi-Fi RSSI (dBm) into five levels
    pub fn from_rssi(rssi: i32) -> Self {
        if rssi <= Self::MIN_RSSI {
            SignalLevel(0)
        } else if rssi >= Self::MAX_RSSI {
            SignalLevel(Self::MAX)
        } else {
            let span = Self::MAX_RSSI - Self::MIN_RSSI;
            let level = (rssi - Self::MIN_RSSI) * i32::from(Self::MAX) / span;
            SignalLevel(level as u8)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Wi-Fi detail carried by `Available`/`Changed`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WifiDetail {
    pub ssid: Option<String>,
    pub signal: Option<SignalLevel>,
}

/// What the tile shows for the cellular transport
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CellularDisplayInfo {
    /// Display name of the data subscription; `None` when there is no data
    /// SIM or the carrier-info permission is missing.
    pub carrier: Option<String>,
    pub generation: RadioGeneration,
    pub signal: Option<SignalLevel>,
}

/// Transport-specific payload of an observer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPayload {
    Wifi(WifiDetail),
    Cellular(CellularDisplayInfo),
}

/// Normalized connectivity notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Available(LinkPayload),
    Lost,
    Changed(LinkPayload),
}

/// A normalized event tagged with the transport it was observed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent {
    pub transport: Transport,
    pub event: NetworkEvent,
}
