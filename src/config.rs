//! Centralized configuration constants for the internet tile
use crate::network::SignalLevel;
use crate::tile::TileIcon;

// UI Dimensions
pub const MAIN_WINDOW_HEIGHT: u16 = 24;
pub const MAIN_WINDOW_WIDTH: u16 = 61;
pub const TILE_HEIGHT: u16 = 5;

// Timing
pub const EVENT_POLL_MS: u64 = 100;
pub const OBSERVER_POLL_MS: u64 = 1500;
pub const GROUND_TRUTH_SYNC_SECS: u64 = 5;
pub const SIMULATED_COMMAND_LATENCY_MS: u64 = 400;
pub const MESSAGE_TIMEOUT_SECS: u64 = 4;
pub const SESSION_STOP_TIMEOUT_MS: u64 = 500;

// Loading animation frames
pub const LOADING_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// Preference keys
pub const LAST_CONNECTED_WIFI_KEY: &str = "last_connected_wifi";
pub const REQUIRE_UNLOCK_KEY: &str = "require_unlock";

// Shell commands
pub const SSID_LOOKUP_COMMAND: &str = "dumpsys netstats | grep -E 'iface=wlan.*(networkId|wifiNetworkKey)'";

/// Texts the tile can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub title: String,
    pub wifi_on: String,
    pub turning_on: String,
    pub no_service: String,
    pub network_not_available: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "Internet".to_string(),
            wifi_on: "Wi-Fi on".to_string(),
            turning_on: "Turning on…".to_string(),
            no_service: "No service".to_string(),
            network_not_available: "Network not available".to_string(),
        }
    }
}

// Icons - Nerd Fonts
pub mod icons {
    pub mod nerd {
        pub const WIFI: [&str; 5] = ["󰤯", "󰤟", "󰤢", "󰤥", "󰤨"]; // nf-md-wifi_strength_*
        pub const CELLULAR: [&str; 5] = ["󰢿", "󰢼", "󰢽", "󰢾", "󰣺"]; // nf-md-signal_cellular_*
        pub const OFFLINE: &str = "󰖪"; // nf-md-wifi_off
        pub const LOCKED: &str = "󰌾"; // nf-md-lock
        pub const ENTER: &str = "󰌑"; // nf-md-keyboard_return
        pub const SPACE: &str = "󱁐"; // nf-md-keyboard_space
        pub const CHECKBOX_ON: &str = "󰄲"; // nf-md-checkbox_marked
        pub const CHECKBOX_OFF: &str = "󰄱"; // nf-md-checkbox_blank_outline
    }

    pub mod ascii {
        pub const WIFI: [&str; 5] = ["W.", "W1", "W2", "W3", "W4"];
        pub const CELLULAR: [&str; 5] = ["C.", "C1", "C2", "C3", "C4"];
        pub const OFFLINE: &str = "--";
        pub const LOCKED: &str = "[L]";
        pub const ENTER: &str = "Enter";
        pub const SPACE: &str = "Space";
        pub const CHECKBOX_ON: &str = "[x]";
        pub const CHECKBOX_OFF: &str = "[ ]";
    }
}

/// Icon set to use based on configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IconSet {
    #[default]
    Nerd,
    Ascii,
}

impl IconSet {
    pub fn tile(&self, icon: TileIcon) -> &'static str {
        let level = |signal: SignalLevel| usize::from(signal.get());
        match (self, icon) {
            (IconSet::Nerd, TileIcon::Wifi(signal)) => icons::nerd::WIFI[level(signal)],
            (IconSet::Nerd, TileIcon::Cellular(signal)) => icons::nerd::CELLULAR[level(signal)],
            (IconSet::Nerd, TileIcon::Offline) => icons::nerd::OFFLINE,
            (IconSet::Ascii, TileIcon::Wifi(signal)) => icons::ascii::WIFI[level(signal)],
            (IconSet::Ascii, TileIcon::Cellular(signal)) => icons::ascii::CELLULAR[level(signal)],
            (IconSet::Ascii, TileIcon::Offline) => icons::ascii::OFFLINE,
        }
    }

    pub fn locked(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::LOCKED,
            IconSet::Ascii => icons::ascii::LOCKED,
        }
    }

    pub fn enter(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::ENTER,
            IconSet::Ascii => icons::ascii::ENTER,
        }
    }

    pub fn space(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::SPACE,
            IconSet::Ascii => icons::ascii::SPACE,
        }
    }

    pub fn checkbox(&self, checked: bool) -> &'static str {
        match (self, checked) {
            (IconSet::Nerd, true) => icons::nerd::CHECKBOX_ON,
            (IconSet::Nerd, false) => icons::nerd::CHECKBOX_OFF,
            (IconSet::Ascii, true) => icons::ascii::CHECKBOX_ON,
            (IconSet::Ascii, false) => icons::ascii::CHECKBOX_OFF,
        }
    }
}
