use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};

use crate::config::SSID_LOOKUP_COMMAND;
use crate::error::{TileError, TileResult};
use crate::network::{CellularLink, NetworkType, OverrideNetworkType, SignalLevel};
use crate::platform::{Platform, SettingsTarget, WifiLink};
use crate::shell::{ShellBackend, ShellOutput};
use crate::tile::ToggleCommand;

/// Everything the simulated device knows about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub wifi_enabled: bool,
    pub data_enabled: bool,
    pub home_ssid: Option<String>,
    /// Whether the connected SSID is readable without a privileged lookup
    pub ssid_visible: bool,
    pub rssi: i32,
    pub carrier: Option<String>,
    pub network_type: NetworkType,
    pub override_type: OverrideNetworkType,
    pub cellular_signal: SignalLevel,
    pub privileged: bool,
    pub carrier_permission: bool,
    pub locked: bool,
    /// How long each toggle takes to land
    pub latency: Duration,
    pub failing: HashSet<ToggleCommand>,
    pub opened_settings: Vec<SettingsTarget>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            wifi_enabled: true,
            data_enabled: false,
            home_ssid: Some("HomeNet".to_string()),
            ssid_visible: true,
            rssi: -60,
            carrier: Some("Proximus".to_string()),
            network_type: NetworkType::Lte,
            override_type: OverrideNetworkType::LteCa,
            cellular_signal: SignalLevel::new(3),
            privileged: true,
            carrier_permission: true,
            locked: false,
            latency: Duration::ZERO,
            failing: HashSet::new(),
            opened_settings: Vec::new(),
        }
    }
}

/// An in-process phone: answers platform queries and runs the handful of
/// shell commands the tile issues against its own state.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    pub fn new(state: DeviceState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> DeviceState {
        self.lock().clone()
    }

    pub fn set_wifi_enabled(&self, enabled: bool) {
        self.lock().wifi_enabled = enabled;
    }

    pub fn set_data_enabled(&self, enabled: bool) {
        self.lock().data_enabled = enabled;
    }

    pub fn set_cellular_signal(&self, signal: SignalLevel) {
        self.lock().cellular_signal = signal;
    }

    pub fn set_locked(&self, locked: bool) {
        self.lock().locked = locked;
    }

    pub fn set_privileged(&self, privileged: bool) {
        self.lock().privileged = privileged;
    }

    /// Make the next run of `command` exit non-zero without changing state
    pub fn fail_next(&self, command: ToggleCommand) {
        self.lock().failing.insert(command);
    }

    fn toggle(&self, command: ToggleCommand) -> ShellOutput {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let mut state = self.lock();
        if state.failing.remove(&command) {
            info!("Simulating failure of `{command}`");
            return ShellOutput::failure(1, format!("{command}: simulated failure"));
        }
        match command {
            ToggleCommand::EnableWifi => state.wifi_enabled = true,
            ToggleCommand::DisableWifi => state.wifi_enabled = false,
            ToggleCommand::EnableData => state.data_enabled = true,
            ToggleCommand::DisableData => state.data_enabled = false,
        }
        ShellOutput::default()
    }

    fn netstats(&self) -> ShellOutput {
        let state = self.lock();
        match (&state.home_ssid, state.wifi_enabled) {
            (Some(ssid), true) => ShellOutput::success([format!(
                "  ident=[{{type=1, ratType=COMBINED, networkId=\"{ssid}\", metered=false, defaultNetwork=true, iface=wlan0}}]"
            )]),
            _ => ShellOutput::failure(1, ""),
        }
    }

    fn open_settings(&self, action: &str) -> ShellOutput {
        let target = [
            SettingsTarget::NetworkOperator,
            SettingsTarget::Wifi,
            SettingsTarget::Wireless,
        ]
        .into_iter()
        .find(|target| target.intent_action() == action);

        match target {
            Some(target) => {
                self.lock().opened_settings.push(target);
                ShellOutput::success([format!("Starting: Intent {{ act={action} }}")])
            }
            None => ShellOutput::failure(1, format!("Error: Activity not started, unable to resolve {action}")),
        }
    }
}

impl Platform for SimulatedDevice {
    fn wifi_enabled(&self) -> TileResult<bool> {
        Ok(self.lock().wifi_enabled)
    }

    fn mobile_data_enabled(&self) -> TileResult<bool> {
        Ok(self.lock().data_enabled)
    }

    fn has_carrier_info_permission(&self) -> bool {
        self.lock().carrier_permission
    }

    fn wifi_link(&self) -> TileResult<Option<WifiLink>> {
        let state = self.lock();
        if !state.wifi_enabled || state.home_ssid.is_none() {
            return Ok(None);
        }
        Ok(Some(WifiLink {
            ssid: state.home_ssid.clone().filter(|_| state.ssid_visible),
            rssi: Some(state.rssi),
        }))
    }

    fn cellular_link(&self) -> TileResult<Option<CellularLink>> {
        let state = self.lock();
        if !state.data_enabled {
            return Ok(None);
        }
        Ok(Some(CellularLink {
            carrier: state.carrier.clone(),
            network_type: state.network_type,
            override_type: state.override_type,
            signal: Some(state.cellular_signal),
        }))
    }

    fn is_locked(&self) -> bool {
        self.lock().locked
    }
}

impl ShellBackend for SimulatedDevice {
    fn name(&self) -> &str {
        "simulated"
    }

    fn has_access(&self) -> bool {
        self.lock().privileged
    }

    fn run(&self, command: &str) -> TileResult<ShellOutput> {
        if !self.has_access() {
            return Err(TileError::NoPrivilegedAccess);
        }
        debug!("simulated shell: {command}");

        let toggle = [
            ToggleCommand::EnableWifi,
            ToggleCommand::DisableWifi,
            ToggleCommand::EnableData,
            ToggleCommand::DisableData,
        ]
        .into_iter()
        .find(|toggle| toggle.shell_command() == command);

        if let Some(toggle) = toggle {
            return Ok(self.toggle(toggle));
        }
        if command == SSID_LOOKUP_COMMAND {
            return Ok(self.netstats());
        }
        if let Some(action) = command.strip_prefix("am start -a ") {
            return Ok(self.open_settings(action.trim()));
        }
        match command {
            "id -u" => Ok(ShellOutput::success(["0"])),
            _ => Ok(ShellOutput::failure(127, format!("{command}: not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ssid_from_netstats;
    use crate::platform::GroundTruth;

    #[test]
    fn toggles_change_ground_truth() {
        let device = SimulatedDevice::default();
        assert_eq!(GroundTruth::read(&device), GroundTruth::new(true, false));

        device.run("svc wifi disable").unwrap();
        device.run("svc data enable").unwrap();
        assert_eq!(GroundTruth::read(&device), GroundTruth::new(false, true));
        assert!(device.wifi_link().unwrap().is_none());
        assert_eq!(
            device.cellular_link().unwrap().and_then(|link| link.carrier).as_deref(),
            Some("Proximus")
        );
    }

    #[test]
    fn scheduled_failure_applies_once() {
        let device = SimulatedDevice::default();
        device.fail_next(ToggleCommand::EnableData);

        let output = device.run("svc data enable").unwrap();
        assert!(!output.is_success());
        assert!(!device.mobile_data_enabled().unwrap());

        assert!(device.run("svc data enable").unwrap().is_success());
        assert!(device.mobile_data_enabled().unwrap());
    }

    #[test]
    fn unprivileged_shell_is_refused() {
        let device = SimulatedDevice::new(DeviceState {
            privileged: false,
            ..DeviceState::default()
        });
        assert!(matches!(
            device.run("svc wifi disable"),
            Err(TileError::NoPrivilegedAccess)
        ));
        assert!(device.wifi_enabled().unwrap());
    }

    #[test]
    fn netstats_lookup_finds_hidden_ssid() {
        let device = SimulatedDevice::new(DeviceState {
            ssid_visible: false,
            ..DeviceState::default()
        });
        assert_eq!(device.wifi_link().unwrap().and_then(|link| link.ssid), None);

        let output = device.run(SSID_LOOKUP_COMMAND).unwrap();
        assert_eq!(ssid_from_netstats(&output.stdout).as_deref(), Some("HomeNet"));
    }

    #[test]
    fn settings_intents_are_recorded() {
        let device = SimulatedDevice::default();
        let output = device.run(&SettingsTarget::Wifi.shell_command()).unwrap();
        assert!(output.is_success());
        assert_eq!(device.state().opened_settings, vec![SettingsTarget::Wifi]);
        assert!(!device.run("am start -a android.settings.NOPE").unwrap().is_success());
    }
}
