//! Network state as the tile sees it: transports, link details and the
//! observer that turns raw platform readings into events.

pub mod cellular;
pub mod observer;
pub mod types;
pub mod wifi;

pub use cellular::{CellularLink, NetworkType, OverrideNetworkType, RadioGeneration, generation_for};
pub use observer::{NetworkObserver, normalize};
pub use types::{
    CellularDisplayInfo, LinkPayload, NetworkEvent, ObservedEvent, SignalLevel, Transport, WifiDetail,
};
pub use wifi::{WifiStatus, parse_wifi_status, ssid_from_netstats};
