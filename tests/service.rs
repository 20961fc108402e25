use std::sync::mpsc as blocking;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use internet_tile::config::{LAST_CONNECTED_WIFI_KEY, REQUIRE_UNLOCK_KEY};
use internet_tile::error::TileResult;
use internet_tile::platform::{DeviceState, SettingsTarget, SimulatedDevice};
use internet_tile::shell::{ShellBackend, ShellOutput};
use internet_tile::store::{MemoryStore, SettingsStore};
use internet_tile::tile::{
    ControllerSnapshot, Mode, TileHandle, TileService, TileState, TileUpdate, ToggleCommand,
    present,
};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    device: Arc<SimulatedDevice>,
    store: Arc<MemoryStore>,
    tile: TileHandle,
}

async fn start(state: DeviceState) -> Harness {
    let device = Arc::new(SimulatedDevice::new(state));
    let store = Arc::new(MemoryStore::default());
    let service = TileService::new(device.clone(), device.clone(), store.clone())
        .with_observer_period(Duration::from_millis(10))
        .with_sync_period(Duration::from_millis(20));
    let tile = service.start().await.expect("session should start");
    Harness {
        device,
        store,
        tile,
    }
}

/// Wait for the first rendered snapshot matching `predicate`
async fn wait_for_snapshot(
    tile: &mut TileHandle,
    mut predicate: impl FnMut(&ControllerSnapshot) -> bool,
) -> ControllerSnapshot {
    tokio::time::timeout(WAIT, async {
        loop {
            match tile.next_update().await {
                Some(TileUpdate::SnapshotChanged(snapshot)) if predicate(&snapshot) => {
                    return snapshot;
                }
                Some(_) => continue,
                None => panic!("session ended early"),
            }
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

async fn wait_for_update(tile: &mut TileHandle, wanted: TileUpdate) {
    tokio::time::timeout(WAIT, async {
        while let Some(update) = tile.next_update().await {
            if update == wanted {
                return;
            }
        }
        panic!("session ended early");
    })
    .await
    .expect("timed out waiting for update");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cycle_from_wifi_settles_on_data() {
    let mut h = start(DeviceState::default()).await;
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleWifiOn).await;

    h.tile.cycle();
    let settled = wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleDataOn).await;

    assert!(!settled.wifi.enabled);
    assert!(!settled.cellular.pending_enable);
    let device = h.device.state();
    assert!(!device.wifi_enabled);
    assert!(device.data_enabled);

    let tile = present(&settled, &Default::default());
    assert_eq!(tile.state, TileState::Active);
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn successful_cycle_never_renders_inactive() {
    let mut h = start(DeviceState {
        latency: Duration::from_millis(50),
        ..DeviceState::default()
    })
    .await;
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleWifiOn).await;

    h.tile.cycle();
    let mut seen = Vec::new();
    wait_for_snapshot(&mut h.tile, |s| {
        seen.push((s.mode(), s.displayed_transport()));
        s.mode() == Mode::IdleDataOn
    })
    .await;
    h.tile.stop().await;

    assert!(
        seen.iter().all(|(_, transport)| transport.is_some()),
        "tile went inactive mid-cycle: {seen:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_cycles_come_back_to_wifi() {
    let mut h = start(DeviceState::default()).await;
    h.tile.cycle();
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleDataOn).await;

    h.tile.cycle();
    wait_for_snapshot(&mut h.tile, |s| {
        s.mode() == Mode::IdleWifiOn && !s.cellular.enabled
    })
    .await;
    h.tile.stop().await;
    assert!(h.device.state().wifi_enabled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cycle_without_access_changes_nothing() {
    let mut h = start(DeviceState {
        privileged: false,
        ..DeviceState::default()
    })
    .await;

    h.tile.cycle();
    wait_for_update(&mut h.tile, TileUpdate::PrivilegedAccessRequired).await;
    h.tile.stop().await;

    let device = h.device.state();
    assert!(device.wifi_enabled);
    assert!(!device.data_enabled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_access_is_reported_before_lock() {
    let mut h = start(DeviceState {
        privileged: false,
        locked: true,
        ..DeviceState::default()
    })
    .await;

    h.tile.cycle();
    let first = tokio::time::timeout(WAIT, async {
        loop {
            match h.tile.next_update().await {
                Some(TileUpdate::SnapshotChanged(_)) => continue,
                other => return other,
            }
        }
    })
    .await
    .expect("timed out waiting for update");
    assert_eq!(first, Some(TileUpdate::PrivilegedAccessRequired));
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn locked_device_defers_cycle_until_unlock() {
    let mut h = start(DeviceState {
        locked: true,
        ..DeviceState::default()
    })
    .await;

    h.tile.cycle();
    wait_for_update(&mut h.tile, TileUpdate::UnlockRequired).await;
    assert!(h.device.state().wifi_enabled);

    h.device.set_locked(false);
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleDataOn).await;
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unlock_preference_can_be_turned_off() {
    let mut h = start(DeviceState {
        locked: true,
        ..DeviceState::default()
    })
    .await;
    h.store.set_bool(REQUIRE_UNLOCK_KEY, false).unwrap();

    h.tile.cycle();
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleDataOn).await;
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_enable_leaves_tile_inactive() {
    let mut h = start(DeviceState::default()).await;
    h.device.fail_next(ToggleCommand::EnableData);

    h.tile.cycle();
    let settled = wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleNone).await;
    assert_eq!(present(&settled, &Default::default()).state, TileState::Inactive);
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn connected_ssid_is_remembered() {
    let mut h = start(DeviceState::default()).await;
    wait_for_snapshot(&mut h.tile, |s| {
        s.wifi_identity.connected_ssid() == Some("HomeNet")
    })
    .await;
    h.tile.stop().await;

    assert_eq!(
        h.store.get_string(LAST_CONNECTED_WIFI_KEY).unwrap().as_deref(),
        Some("HomeNet")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hidden_ssid_is_looked_up() {
    let mut h = start(DeviceState {
        ssid_visible: false,
        ..DeviceState::default()
    })
    .await;
    let snapshot = wait_for_snapshot(&mut h.tile, |s| {
        s.wifi_identity.connected_ssid().is_some()
    })
    .await;
    assert_eq!(snapshot.wifi_identity.connected_ssid(), Some("HomeNet"));
    h.tile.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn long_press_opens_settings_for_active_transport() {
    let mut h = start(DeviceState {
        wifi_enabled: false,
        data_enabled: true,
        ..DeviceState::default()
    })
    .await;
    wait_for_snapshot(&mut h.tile, |s| s.mode() == Mode::IdleDataOn).await;

    h.tile.long_press();
    wait_for_update(
        &mut h.tile,
        TileUpdate::OpenSettings(SettingsTarget::NetworkOperator),
    )
    .await;
    h.tile.stop().await;

    assert_eq!(
        h.device.state().opened_settings,
        vec![SettingsTarget::NetworkOperator]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sessions_can_be_restarted() {
    let device = Arc::new(SimulatedDevice::default());
    let store = Arc::new(MemoryStore::default());
    let service = TileService::new(device.clone(), device.clone(), store)
        .with_observer_period(Duration::from_millis(10))
        .with_sync_period(Duration::from_millis(20));

    let first = service.start().await.unwrap();
    first.stop().await;

    device.set_wifi_enabled(false);
    let mut second = service.start().await.unwrap();
    wait_for_snapshot(&mut second, |s| s.mode() == Mode::IdleNone).await;
    second.stop().await;
}

/// A shell whose toggles block until `release` is dropped
struct StuckShell {
    release: Mutex<blocking::Receiver<()>>,
}

impl ShellBackend for StuckShell {
    fn name(&self) -> &str {
        "stuck"
    }

    fn has_access(&self) -> bool {
        true
    }

    fn run(&self, command: &str) -> TileResult<ShellOutput> {
        if command.starts_with("svc ") {
            let release = self.release.lock().unwrap_or_else(|e| e.into_inner());
            let _ = release.recv();
        }
        Ok(ShellOutput::default())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_does_not_wait_for_hung_commands() {
    let (release, gate) = blocking::channel();
    let device = Arc::new(SimulatedDevice::default());
    let shell = Arc::new(StuckShell {
        release: Mutex::new(gate),
    });
    let service = TileService::new(device, shell, Arc::new(MemoryStore::default()))
        .with_observer_period(Duration::from_millis(10))
        .with_sync_period(Duration::from_millis(20));

    let mut tile = service.start().await.unwrap();
    tile.cycle();
    wait_for_snapshot(&mut tile, |s| s.mode() == Mode::SwitchingToData).await;

    tokio::time::timeout(Duration::from_secs(2), tile.stop())
        .await
        .expect("stop waited on a hung command");
    drop(release);
}
