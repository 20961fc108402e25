//! Extraction of Wi-Fi identity from privileged shell output.

use std::sync::LazyLock;

use regex::Regex;

static NETSTATS_SSID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:networkId|wifiNetworkKey)="([^"]*)""#).expect("static regex")
});

static STATUS_SSID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"connected to "([^"]*)""#).expect("static regex"));

static STATUS_RSSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RSSI: (-?\d+)").expect("static regex"));

/// Find the SSID of the active Wi-Fi interface in `dumpsys netstats` output.
///
/// Only `iface=wlan*` identities are considered; the first match wins.
pub fn ssid_from_netstats<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| line.contains("iface=wlan"))
        .find_map(|line| NETSTATS_SSID.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|ssid| !ssid.is_empty())
}

/// Connection state parsed from `cmd wifi status`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WifiStatus {
    pub enabled: bool,
    pub connected: bool,
    pub ssid: Option<String>,
    pub rssi: Option<i32>,
}

pub fn parse_wifi_status<S: AsRef<str>>(lines: &[S]) -> WifiStatus {
    let mut status = WifiStatus::default();
    for line in lines.iter().map(AsRef::as_ref) {
        let line = line.trim();
        if line == "Wifi is enabled" {
            status.enabled = true;
        }
        if let Some(caps) = STATUS_SSID.captures(line) {
            status.connected = true;
            status.ssid = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .filter(|ssid| !ssid.is_empty() && ssid != "<unknown ssid>");
        }
        if status.rssi.is_none() {
            status.rssi = STATUS_RSSI
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
        }
    }
    status
}
