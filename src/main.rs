mod app;
mod event;
mod theme;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, eyre};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use env_logger::{Builder, Env, Target};
use log::info;

use internet_tile::config::{self, IconSet, REQUIRE_UNLOCK_KEY};
use internet_tile::platform::{AndroidPlatform, DeviceState, Platform, SimulatedDevice};
use internet_tile::shell::{ProcessShell, ShellBackend, ShellKind};
use internet_tile::store::{JsonFileStore, SettingsStore};
use internet_tile::tile::TileService;

use crate::{app::AppState, event::run};

/// Where privileged commands and platform queries go
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// An in-process device with simulator controls
    Simulated,
    /// A rooted device shell (`su -c`)
    Root,
    /// A broker-granted shell (`rish -c`)
    Rish,
}

/// A single toggle that cycles between Wi-Fi and mobile data
#[derive(Parser, Debug)]
#[command(
    name = "internet-tile",
    author = "Soham Waghmare",
    about = "A single toggle that cycles between Wi-Fi and mobile data and mirrors live network state.",
    long_about = None,
    version = env!("CARGO_PKG_VERSION"),
    disable_version_flag = true
)]
struct Args {
    /// Print version information
    #[arg(short = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Device backend
    #[arg(long, value_enum, default_value_t = Backend::Simulated)]
    backend: Backend,

    /// Use ASCII icons (no Nerd Fonts required)
    #[arg(long)]
    ascii: bool,

    /// Show key logger for debugging
    #[arg(long = "show-keys")]
    show_keys: bool,

    /// Preferences file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log file (defaults to the user cache directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Act as if carrier information may not be read
    #[arg(long = "no-carrier-info")]
    no_carrier_info: bool,

    /// Save whether switching needs an unlocked device
    #[arg(long = "require-unlock")]
    require_unlock: Option<bool>,

    /// Link state poll interval in milliseconds
    #[arg(long = "poll-ms", default_value_t = config::OBSERVER_POLL_MS)]
    poll_ms: u64,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn default_path(base: Option<PathBuf>, file: &str) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir)
        .join(env!("CARGO_PKG_NAME"))
        .join(file)
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut builder = if verbose {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };
    builder
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| eyre!("Could not initialise logging: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| default_path(dirs::cache_dir(), "internet-tile.log"));
    init_logging(&log_path, args.verbose)?;

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(|| default_path(dirs::config_dir(), "settings.json"));
    let file_store = JsonFileStore::open(&settings_path)?;
    info!(
        "Starting with {:?} backend, settings at {}",
        args.backend,
        file_store.path().display()
    );
    let store: Arc<dyn SettingsStore> = Arc::new(file_store);
    if let Some(require_unlock) = args.require_unlock {
        store.set_bool(REQUIRE_UNLOCK_KEY, require_unlock)?;
    }

    let icons = if args.ascii { IconSet::Ascii } else { IconSet::Nerd };
    let poll = Duration::from_millis(args.poll_ms.max(1));

    let (platform, shell, device): (Arc<dyn Platform>, Arc<dyn ShellBackend>, _) = match args.backend {
        Backend::Simulated => {
            let device = Arc::new(SimulatedDevice::new(DeviceState {
                carrier_permission: !args.no_carrier_info,
                latency: Duration::from_millis(config::SIMULATED_COMMAND_LATENCY_MS),
                ..DeviceState::default()
            }));
            let platform: Arc<dyn Platform> = device.clone();
            let shell: Arc<dyn ShellBackend> = device.clone();
            (platform, shell, Some(device))
        }
        Backend::Root | Backend::Rish => {
            let kind = match args.backend {
                Backend::Rish => ShellKind::Rish,
                _ => ShellKind::Root,
            };
            let shell: Arc<dyn ShellBackend> = Arc::new(ProcessShell::new(kind));
            let android = AndroidPlatform::new(Arc::clone(&shell), !args.no_carrier_info);
            info!("Mobile data strategy: {:?}", android.mobile_data_strategy());
            let platform: Arc<dyn Platform> = Arc::new(android);
            (platform, shell, None)
        }
    };

    let backend_name = shell.name().to_string();
    let service = TileService::new(platform, shell, Arc::clone(&store)).with_observer_period(poll);
    let mut state = AppState::new(service, store, backend_name, args.show_keys, icons);
    if let Some(device) = device {
        state = state.with_device(device);
    }

    let terminal = ratatui::init();
    enable_raw_mode()?;
    let result = run(terminal, &mut state).await;
    disable_raw_mode()?;

    ratatui::restore();
    result
}
