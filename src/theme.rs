//! Colors of the tile window, named by what they mark.
use internet_tile::tile::{TileIcon, TransportState};
use ratatui::style::Color;

pub const BACKGROUND: Color = Color::Rgb(24, 23, 21); // #181715
pub const FOREGROUND: Color = Color::Rgb(168, 163, 159); // #A8A39F
pub const DIMMED: Color = Color::Rgb(85, 84, 69); // #555445

pub const WIFI: Color = Color::Rgb(73, 127, 125); // #497F7D
pub const WIFI_BG: Color = Color::Rgb(30, 45, 44); // #1E2D2C
pub const CELLULAR: Color = Color::Rgb(205, 124, 84); // #CD7C54
pub const CELLULAR_BG: Color = Color::Rgb(65, 56, 41); // #413829

pub const ENABLED: Color = Color::Rgb(71, 154, 67); // #479A43
pub const SWITCHING: Color = Color::Rgb(127, 113, 17); // #7F7111
pub const ERROR: Color = Color::Rgb(152, 41, 15); // #98290F

pub const LABEL: Color = Color::Rgb(56, 127, 88); // #387F58
pub const PANEL: Color = Color::Rgb(127, 78, 47); // #7F4E2F
pub const KEY_LOGGER: Color = CELLULAR;

/// Border and fill of the tile for the transport it shows
pub fn tile_colors(icon: TileIcon) -> (Color, Color) {
    match icon {
        TileIcon::Wifi(_) => (WIFI, WIFI_BG),
        TileIcon::Cellular(_) => (CELLULAR, CELLULAR_BG),
        TileIcon::Offline => (DIMMED, BACKGROUND),
    }
}

pub fn transport_color(transport: TransportState) -> Color {
    match (transport.enabled, transport.pending_enable) {
        (_, true) => SWITCHING,
        (true, false) => ENABLED,
        (false, false) => DIMMED,
    }
}
