use std::sync::{Arc, LazyLock};

use log::{debug, warn};
use regex::Regex;

use crate::error::{TileError, TileResult};
use crate::network::{CellularLink, NetworkType, OverrideNetworkType, SignalLevel, parse_wifi_status};
use crate::platform::{Platform, WifiLink};
use crate::shell::{ShellBackend, ShellOutput};

static DATA_CONNECTION_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mDataConnectionState=(-?\d+)").expect("static regex"));

static DISPLAY_OVERRIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"override=([A-Z_]+)").expect("static regex"));

static SIGNAL_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mSignalStrength=.*?level=(\d)").expect("static regex"));

/// `TelephonyManager.DATA_CONNECTED`
const DATA_CONNECTED: i32 = 2;

/// Android 11, where mobile data became a per-subscription setting
const PER_SUBSCRIPTION_SDK: u32 = 30;

/// Where the mobile data switch lives in `settings`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileDataStrategy {
    GlobalSetting,
    Subscription { sub_id: u32 },
}

impl MobileDataStrategy {
    /// Pick the setting for the default data subscription of this device
    pub fn detect(shell: &dyn ShellBackend) -> Self {
        let sdk = shell
            .run("getprop ro.build.version.sdk")
            .ok()
            .and_then(|output| output.first_line().and_then(|line| line.parse::<u32>().ok()));

        let Some(sdk) = sdk.filter(|sdk| *sdk >= PER_SUBSCRIPTION_SDK) else {
            return MobileDataStrategy::GlobalSetting;
        };

        let sub_id = shell
            .run("settings get global multi_sim_data_call")
            .ok()
            .and_then(|output| output.first_line().and_then(|line| line.parse::<u32>().ok()));

        match sub_id {
            Some(sub_id) => {
                debug!("SDK {sdk}: using mobile data setting of subscription {sub_id}");
                MobileDataStrategy::Subscription { sub_id }
            }
            None => MobileDataStrategy::GlobalSetting,
        }
    }

    pub fn query_command(self) -> String {
        match self {
            MobileDataStrategy::GlobalSetting => "settings get global mobile_data".to_string(),
            MobileDataStrategy::Subscription { sub_id } => {
                format!("settings get global mobile_data{sub_id}")
            }
        }
    }
}

/// `settings get` prints `1`/`0`, or `null` for an unset key
fn parse_flag(line: Option<&str>) -> bool {
    line.and_then(|value| value.parse::<i64>().ok())
        .is_some_and(|value| value != 0)
}

/// First comma-separated entry of a multi-SIM property
fn first_sim_value(line: Option<&str>) -> Option<&str> {
    line.and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// What the tile needs from `dumpsys telephony.registry`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryInfo {
    pub data_connected: bool,
    pub override_type: OverrideNetworkType,
    pub signal: Option<SignalLevel>,
}

pub fn parse_registry<S: AsRef<str>>(lines: &[S]) -> RegistryInfo {
    let mut state: Option<i32> = None;
    let mut override_type: Option<OverrideNetworkType> = None;
    let mut signal: Option<SignalLevel> = None;

    for line in lines.iter().map(AsRef::as_ref) {
        if state.is_none() {
            state = DATA_CONNECTION_STATE
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
        }
        if override_type.is_none() {
            override_type = DISPLAY_OVERRIDE
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
        }
        if signal.is_none() {
            signal = SIGNAL_LEVEL
                .captures(line)
                .and_then(|caps| caps[1].parse().ok())
                .map(SignalLevel::new);
        }
    }

    RegistryInfo {
        data_connected: state == Some(DATA_CONNECTED),
        override_type: override_type.unwrap_or_default(),
        signal,
    }
}

/// A real device, queried through a privileged shell
pub struct AndroidPlatform {
    shell: Arc<dyn ShellBackend>,
    mobile_data: MobileDataStrategy,
    carrier_permission: bool,
}

impl AndroidPlatform {
    pub fn new(shell: Arc<dyn ShellBackend>, carrier_permission: bool) -> Self {
        let mobile_data = MobileDataStrategy::detect(shell.as_ref());
        Self {
            shell,
            mobile_data,
            carrier_permission,
        }
    }

    pub fn mobile_data_strategy(&self) -> MobileDataStrategy {
        self.mobile_data
    }

    fn query(&self, command: &str) -> TileResult<ShellOutput> {
        let output = self.shell.run(command)?;
        if !output.is_success() {
            return Err(TileError::CommandFailed {
                command: command.to_string(),
                code: output.code,
            });
        }
        Ok(output)
    }

    fn getprop(&self, name: &str) -> TileResult<Option<String>> {
        let output = self.query(&format!("getprop {name}"))?;
        Ok(first_sim_value(output.first_line()).map(str::to_string))
    }
}

impl Platform for AndroidPlatform {
    fn wifi_enabled(&self) -> TileResult<bool> {
        let output = self.query("settings get global wifi_on")?;
        Ok(parse_flag(output.first_line()))
    }

    fn mobile_data_enabled(&self) -> TileResult<bool> {
        let output = self.query(&self.mobile_data.query_command())?;
        Ok(parse_flag(output.first_line()))
    }

    fn has_carrier_info_permission(&self) -> bool {
        self.carrier_permission
    }

    fn wifi_link(&self) -> TileResult<Option<WifiLink>> {
        let status = parse_wifi_status(&self.query("cmd wifi status")?.stdout);
        if !status.enabled || !status.connected {
            return Ok(None);
        }
        Ok(Some(WifiLink {
            ssid: status.ssid,
            rssi: status.rssi,
        }))
    }

    fn cellular_link(&self) -> TileResult<Option<CellularLink>> {
        let registry = parse_registry(&self.query("dumpsys telephony.registry")?.stdout);
        if !registry.data_connected {
            return Ok(None);
        }

        let network_type = match self.getprop("gsm.network.type")? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{e}, showing no generation");
                NetworkType::Unknown
            }),
            None => NetworkType::Unknown,
        };

        Ok(Some(CellularLink {
            carrier: self.getprop("gsm.operator.alpha")?,
            network_type,
            override_type: registry.override_type,
            signal: registry.signal,
        }))
    }

    fn is_locked(&self) -> bool {
        match self.query("dumpsys deviceidle") {
            Ok(output) => output
                .stdout
                .iter()
                .any(|line| line.trim() == "mScreenLocked=true"),
            Err(e) => {
                debug!("Could not read lock state, assuming unlocked: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RadioGeneration;
    use std::collections::HashMap;

    /// Canned answers keyed by the exact command line
    struct ScriptedShell {
        answers: HashMap<&'static str, ShellOutput>,
    }

    impl ScriptedShell {
        fn new(answers: &[(&'static str, &[&str])]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(command, lines)| (*command, ShellOutput::success(lines.iter().copied())))
                    .collect(),
            }
        }
    }

    impl ShellBackend for ScriptedShell {
        fn name(&self) -> &str {
            "scripted"
        }

        fn has_access(&self) -> bool {
            true
        }

        fn run(&self, command: &str) -> TileResult<ShellOutput> {
            Ok(self
                .answers
                .get(command)
                .cloned()
                .unwrap_or_else(|| ShellOutput::failure(127, "not found")))
        }
    }

    const REGISTRY: &[&str] = &[
        "last known state:",
        "  Phone Id=0",
        "  mDataConnectionState=2",
        "  mSignalStrength=SignalStrength:{mCdma=Invalid,mLte=CellSignalStrengthLte: rssi=-63 rsrp=-95 level=3,primary=CellSignalStrengthLte}",
        "  mTelephonyDisplayInfo=TelephonyDisplayInfo {network=LTE, overrideNetwork=LTE_CA, override=LTE_CA, isRoaming=false}",
        "  Phone Id=1",
        "  mDataConnectionState=0",
    ];

    #[test]
    fn registry_dump_is_parsed() {
        let info = parse_registry(REGISTRY);
        assert!(info.data_connected);
        assert_eq!(info.override_type, OverrideNetworkType::LteCa);
        assert_eq!(info.signal, Some(SignalLevel::new(3)));
        assert_eq!(parse_registry(&["mDataConnectionState=0"]), RegistryInfo::default());
    }

    #[test]
    fn flags_and_multi_sim_props() {
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("null")));
        assert!(!parse_flag(None));
        assert_eq!(first_sim_value(Some("LTE,Unknown")), Some("LTE"));
        assert_eq!(first_sim_value(Some(",")), None);
    }

    #[test]
    fn newer_releases_use_the_data_subscription() {
        let shell = ScriptedShell::new(&[
            ("getprop ro.build.version.sdk", &["33"]),
            ("settings get global multi_sim_data_call", &["2"]),
        ]);
        let strategy = MobileDataStrategy::detect(&shell);
        assert_eq!(strategy, MobileDataStrategy::Subscription { sub_id: 2 });
        assert_eq!(strategy.query_command(), "settings get global mobile_data2");

        let old = ScriptedShell::new(&[("getprop ro.build.version.sdk", &["29"])]);
        assert_eq!(MobileDataStrategy::detect(&old), MobileDataStrategy::GlobalSetting);
    }

    #[test]
    fn device_state_is_read_through_the_shell() {
        let shell = Arc::new(ScriptedShell::new(&[
            ("getprop ro.build.version.sdk", &["28"]),
            ("settings get global wifi_on", &["0"]),
            ("settings get global mobile_data", &["1"]),
            ("cmd wifi status", &["Wifi is disabled"]),
            ("dumpsys telephony.registry", REGISTRY),
            ("getprop gsm.network.type", &["LTE,Unknown"]),
            ("getprop gsm.operator.alpha", &["Proximus,"]),
            ("dumpsys deviceidle", &["  mScreenOn=true", "  mScreenLocked=true"]),
        ]));
        let platform = AndroidPlatform::new(shell, true);

        assert!(!platform.wifi_enabled().unwrap());
        assert!(platform.mobile_data_enabled().unwrap());
        assert_eq!(platform.wifi_link().unwrap(), None);
        assert!(platform.is_locked());

        let link = platform.cellular_link().unwrap().unwrap();
        assert_eq!(link.carrier.as_deref(), Some("Proximus"));
        assert_eq!(link.display_info(true).generation, RadioGeneration::G4Plus);
    }

    #[test]
    fn connected_wifi_is_reported() {
        let shell = Arc::new(ScriptedShell::new(&[
            ("cmd wifi status", &[
                "Wifi is enabled",
                "Wifi is connected to \"HomeNet\"",
                "WifiInfo: SSID: \"HomeNet\", BSSID: 02:00:00:00:00:00, RSSI: -61, Link speed: 433Mbps",
            ]),
        ]));
        let platform = AndroidPlatform::new(shell, false);
        assert_eq!(
            platform.wifi_link().unwrap(),
            Some(WifiLink {
                ssid: Some("HomeNet".to_string()),
                rssi: Some(-61),
            })
        );
    }

    #[test]
    fn failed_query_is_an_error() {
        let platform = AndroidPlatform::new(Arc::new(ScriptedShell::new(&[])), true);
        assert!(matches!(
            platform.wifi_enabled(),
            Err(TileError::CommandFailed { code: 127, .. })
        ));
        assert!(!platform.is_locked());
    }
}
