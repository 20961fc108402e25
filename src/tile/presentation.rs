use crate::config::Labels;
use crate::network::{CellularDisplayInfo, SignalLevel, Transport};
use crate::tile::state::ControllerSnapshot;

/// Whether the tile is drawn as on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Active,
    Inactive,
}

/// Which glyph the tile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileIcon {
    Wifi(SignalLevel),
    Cellular(SignalLevel),
    Offline,
}

/// Visual description of the tile, independent of any toolkit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDescriptor {
    pub state: TileState,
    pub icon: TileIcon,
    pub label: Option<String>,
}

/// Map a controller snapshot to what the tile should look like.
///
/// Wi-Fi wins while it is enabled or being enabled, unless a data switch is
/// in flight; then cellular; otherwise the tile is inactive.
pub fn present(snapshot: &ControllerSnapshot, labels: &Labels) -> TileDescriptor {
    match snapshot.displayed_transport() {
        Some(Transport::Wifi) => {
            let label = match snapshot.wifi_identity.connected_ssid() {
                Some(ssid) => ssid.to_string(),
                None if snapshot.wifi.pending_enable => labels.turning_on.clone(),
                None => labels.wifi_on.clone(),
            };
            TileDescriptor {
                state: TileState::Active,
                icon: TileIcon::Wifi(snapshot.wifi_signal.unwrap_or_default()),
                label: Some(label),
            }
        }
        Some(Transport::Cellular) => TileDescriptor {
            state: TileState::Active,
            icon: TileIcon::Cellular(snapshot.cellular_display.signal.unwrap_or_default()),
            label: Some(cellular_text(&snapshot.cellular_display, labels)),
        },
        None => TileDescriptor {
            state: TileState::Inactive,
            icon: TileIcon::Offline,
            label: None,
        },
    }
}

/// Carrier and generation, e.g. `"Proximus, 4G+"`
pub fn cellular_text(info: &CellularDisplayInfo, labels: &Labels) -> String {
    let Some(carrier) = info.carrier.as_deref() else {
        return labels.network_not_available.clone();
    };
    if info.signal.is_some_and(SignalLevel::is_none) {
        return labels.no_service.clone();
    }
    match info.generation.label() {
        Some(generation) => format!("{carrier}, {generation}"),
        None => carrier.to_string(),
    }
}
