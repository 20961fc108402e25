use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use log::{info, warn};

use internet_tile::config::{self, IconSet, Labels, REQUIRE_UNLOCK_KEY};
use internet_tile::platform::{SettingsTarget, SimulatedDevice};
use internet_tile::store::SettingsStore;
use internet_tile::tile::{
    ControllerSnapshot, TileDescriptor, TileHandle, TileService, TileUpdate, present,
};

/// Transient message shown in a popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PrivilegedAccessRequired,
    UnlockRequired,
    OpenedSettings(SettingsTarget),
    TileHidden,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::PrivilegedAccessRequired => " ACCESS REQUIRED ",
            Notice::UnlockRequired => " LOCKED ",
            Notice::OpenedSettings(_) => " SETTINGS ",
            Notice::TileHidden => " HIDDEN ",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::PrivilegedAccessRequired => {
                "Grant root or rish access to switch networks".to_string()
            }
            Notice::UnlockRequired => "Unlock the device to switch networks".to_string(),
            Notice::OpenedSettings(target) => format!("Opened {}", target.intent_action()),
            Notice::TileHidden => "The tile is hidden, press v to show it".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::PrivilegedAccessRequired | Notice::UnlockRequired)
    }
}

#[derive(Debug)]
pub struct UiState {
    pub icons: IconSet,
    pub labels: Labels,
    pub loading_frame: usize,
    pub show_key_logger: bool,
    pub last_key_press: Option<(String, Instant)>,
    pub notice: Option<(Notice, Instant)>,
}

pub struct AppState {
    pub ui: UiState,
    pub backend: String,
    pub service: TileService,
    pub tile: Option<TileHandle>,
    pub snapshot: Option<ControllerSnapshot>,
    pub store: Arc<dyn SettingsStore>,
    /// Present only when running against the simulated device
    pub device: Option<Arc<SimulatedDevice>>,
}

impl AppState {
    pub fn new(
        service: TileService,
        store: Arc<dyn SettingsStore>,
        backend: impl Into<String>,
        show_key_logger: bool,
        icons: IconSet,
    ) -> AppState {
        AppState {
            ui: UiState {
                icons,
                labels: Labels::default(),
                loading_frame: 0,
                show_key_logger,
                last_key_press: None,
                notice: None,
            },
            backend: backend.into(),
            service,
            tile: None,
            snapshot: None,
            store,
            device: None,
        }
    }

    pub fn with_device(mut self, device: Arc<SimulatedDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn is_listening(&self) -> bool {
        self.tile.is_some()
    }

    pub fn descriptor(&self) -> Option<TileDescriptor> {
        self.snapshot
            .as_ref()
            .map(|snapshot| present(snapshot, &self.ui.labels))
    }

    pub fn is_switching(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.mode().is_switching())
    }

    pub fn require_unlock(&self) -> bool {
        self.store.get_bool(REQUIRE_UNLOCK_KEY, true)
    }

    pub fn toggle_require_unlock(&mut self) {
        let value = !self.require_unlock();
        if let Err(e) = self.store.set_bool(REQUIRE_UNLOCK_KEY, value) {
            warn!("Could not save require-unlock preference: {e}");
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.ui.notice = Some((notice, Instant::now()));
    }

    pub fn expire_notice(&mut self) {
        if let Some((_, shown)) = &self.ui.notice
            && shown.elapsed() > Duration::from_secs(config::MESSAGE_TIMEOUT_SECS)
        {
            self.ui.notice = None;
        }
    }

    pub fn apply(&mut self, update: TileUpdate) {
        match update {
            TileUpdate::SnapshotChanged(snapshot) => self.snapshot = Some(snapshot),
            TileUpdate::PrivilegedAccessRequired => self.notify(Notice::PrivilegedAccessRequired),
            TileUpdate::UnlockRequired => self.notify(Notice::UnlockRequired),
            TileUpdate::OpenSettings(target) => self.notify(Notice::OpenedSettings(target)),
        }
    }

    /// Drain everything the session has reported since the last frame
    pub fn poll_updates(&mut self) {
        let mut updates = Vec::new();
        if let Some(tile) = self.tile.as_mut() {
            while let Some(update) = tile.try_update() {
                updates.push(update);
            }
        }
        for update in updates {
            self.apply(update);
        }
    }

    pub async fn show_tile(&mut self) -> Result<()> {
        if self.tile.is_none() {
            self.tile = Some(self.service.start().await?);
        }
        Ok(())
    }

    pub async fn hide_tile(&mut self) {
        if let Some(tile) = self.tile.take() {
            tile.stop().await;
            info!("Tile hidden");
        }
        self.snapshot = None;
    }

    pub async fn toggle_tile(&mut self) -> Result<()> {
        match self.is_listening() {
            true => {
                self.hide_tile().await;
                Ok(())
            }
            false => self.show_tile().await,
        }
    }
}
