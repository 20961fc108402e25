//! The owning task of a listening session.
//!
//! Everything that touches the controller is funnelled onto one task:
//! observer events, executor completions, user actions and a periodic
//! ground-truth tick. Effects requested by the controller are carried out
//! here and surfaced to the front end as [`TileUpdate`]s.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{
    GROUND_TRUTH_SYNC_SECS, LAST_CONNECTED_WIFI_KEY, OBSERVER_POLL_MS, REQUIRE_UNLOCK_KEY,
    SESSION_STOP_TIMEOUT_MS, SSID_LOOKUP_COMMAND,
};
use crate::error::TileResult;
use crate::network::{NetworkObserver, ObservedEvent, Transport, ssid_from_netstats};
use crate::platform::{GroundTruth, Platform, SettingsTarget};
use crate::shell::{CommandExecutor, Completion, ShellBackend};
use crate::store::SettingsStore;
use crate::tile::command::Ticket;
use crate::tile::machine::{Effect, Input, TransitionController};
use crate::tile::state::ControllerSnapshot;
use crate::traits::MealyMachine;

/// What the user did to the tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Cycle,
    LongPress,
    /// End the listening session (tile hidden)
    Stop,
}

/// What the front end should show or do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileUpdate {
    SnapshotChanged(ControllerSnapshot),
    PrivilegedAccessRequired,
    /// A cycle was deferred until the device is unlocked
    UnlockRequired,
    OpenSettings(SettingsTarget),
}

/// Tag of an executor job, so completions can be routed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Toggle(Ticket),
    ResolveSsid,
    OpenSettings(SettingsTarget),
}

/// Collaborators shared by every listening session
#[derive(Clone)]
pub struct TileService {
    platform: Arc<dyn Platform>,
    shell: Arc<dyn ShellBackend>,
    store: Arc<dyn SettingsStore>,
    observer_period: Duration,
    sync_period: Duration,
}

impl TileService {
    pub fn new(
        platform: Arc<dyn Platform>,
        shell: Arc<dyn ShellBackend>,
        store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            platform,
            shell,
            store,
            observer_period: Duration::from_millis(OBSERVER_POLL_MS),
            sync_period: Duration::from_secs(GROUND_TRUTH_SYNC_SECS),
        }
    }

    pub fn with_observer_period(mut self, period: Duration) -> Self {
        self.observer_period = period;
        self
    }

    pub fn with_sync_period(mut self, period: Duration) -> Self {
        self.sync_period = period;
        self
    }

    /// Begin a listening session (tile shown).
    ///
    /// Reads the current ground truth and last known SSID, subscribes to both
    /// transports and spawns the session task. Must be called from within a
    /// tokio runtime.
    pub async fn start(&self) -> TileResult<TileHandle> {
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let (actions, actions_rx) = mpsc::unbounded_channel();
        let (observed_tx, observed_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let last_known_ssid = self.store.get_string(LAST_CONNECTED_WIFI_KEY).unwrap_or_else(|e| {
            warn!("Could not read last connected Wi-Fi: {e}");
            None
        });
        let ground = read_ground_truth(&self.platform).await;
        let controller = TransitionController::start(ground, last_known_ssid);
        info!(
            "Listening session started in mode {} via {} shell",
            controller.mode(),
            self.shell.name()
        );

        let mut observer = NetworkObserver::new(Arc::clone(&self.platform), self.observer_period);
        observer.start_listening(Transport::Wifi, observed_tx.clone())?;
        observer.start_listening(Transport::Cellular, observed_tx)?;

        let session = Session {
            platform: Arc::clone(&self.platform),
            shell: Arc::clone(&self.shell),
            store: Arc::clone(&self.store),
            executor: CommandExecutor::spawn(Arc::clone(&self.shell), completions_tx),
            observer,
            updates: updates_tx,
            deferred_cycle: false,
        };

        let task = tokio::spawn(session.run(
            controller,
            self.sync_period,
            actions_rx,
            observed_rx,
            completions_rx,
        ));

        Ok(TileHandle {
            actions,
            updates,
            task,
        })
    }
}

/// Front-end side of a running listening session
pub struct TileHandle {
    actions: UnboundedSender<UserAction>,
    updates: UnboundedReceiver<TileUpdate>,
    task: JoinHandle<()>,
}

impl TileHandle {
    pub fn send(&self, action: UserAction) {
        if self.actions.send(action).is_err() {
            warn!("Tile session has ended; dropping {action:?}");
        }
    }

    pub fn cycle(&self) {
        self.send(UserAction::Cycle);
    }

    pub fn long_press(&self) {
        self.send(UserAction::LongPress);
    }

    /// Next pending update without waiting
    pub fn try_update(&mut self) -> Option<TileUpdate> {
        self.updates.try_recv().ok()
    }

    pub async fn next_update(&mut self) -> Option<TileUpdate> {
        self.updates.recv().await
    }

    /// End the session. Queued commands keep running in the background; a
    /// session stuck on a platform query is aborted after a short grace period.
    pub async fn stop(self) {
        let Self {
            actions, mut task, ..
        } = self;
        let _ = actions.send(UserAction::Stop);
        let grace = Duration::from_millis(SESSION_STOP_TIMEOUT_MS);
        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Tile session ended abnormally: {e}"),
            Err(_) => {
                warn!("Tile session did not stop within {grace:?}, aborting");
                task.abort();
            }
        }
    }
}

async fn read_ground_truth(platform: &Arc<dyn Platform>) -> GroundTruth {
    let platform = Arc::clone(platform);
    tokio::task::spawn_blocking(move || GroundTruth::read(platform.as_ref()))
        .await
        .unwrap_or_else(|e| {
            warn!("Ground truth query panicked, assuming disabled: {e}");
            GroundTruth::default()
        })
}

struct Session {
    platform: Arc<dyn Platform>,
    shell: Arc<dyn ShellBackend>,
    store: Arc<dyn SettingsStore>,
    executor: CommandExecutor<Job>,
    observer: NetworkObserver,
    updates: UnboundedSender<TileUpdate>,
    deferred_cycle: bool,
}

impl Session {
    async fn run(
        mut self,
        mut controller: TransitionController,
        sync_period: Duration,
        mut actions: UnboundedReceiver<UserAction>,
        mut observed: UnboundedReceiver<ObservedEvent>,
        mut completions: UnboundedReceiver<Completion<Job>>,
    ) {
        let mut ticker = tokio::time::interval(sync_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                action = actions.recv() => match action {
                    Some(UserAction::Cycle) => controller = self.click(controller).await,
                    Some(UserAction::LongPress) => self.long_press(&controller),
                    Some(UserAction::Stop) | None => break,
                },
                Some(event) = observed.recv() => {
                    controller = self.feed(controller, Input::Observed(event));
                    controller = self.resync(controller).await;
                }
                Some(completion) = completions.recv() => {
                    controller = self.complete(controller, completion);
                    controller = self.resync(controller).await;
                }
                _ = ticker.tick() => {
                    controller = self.resync(controller).await;
                    if self.deferred_cycle && !self.locked_out().await {
                        info!("Device unlocked, running deferred cycle");
                        self.deferred_cycle = false;
                        controller = self.cycle(controller).await;
                    }
                }
            }
        }

        info!("Listening session stopped in mode {}", controller.mode());
        self.observer.stop_listening(Transport::Wifi);
        self.observer.stop_listening(Transport::Cellular);
    }

    fn notify(&self, update: TileUpdate) {
        if self.updates.send(update).is_err() {
            debug!("Tile update receiver dropped");
        }
    }

    /// Feed one input and carry out the effects it produced
    fn feed(&mut self, controller: TransitionController, input: Input) -> TransitionController {
        let (controller, effects) = controller.transition(input);
        for effect in effects {
            match effect {
                Effect::Submit(ticket) => self
                    .executor
                    .submit(Job::Toggle(ticket), ticket.command.shell_command()),
                Effect::ResolveSsid => self.executor.submit(Job::ResolveSsid, SSID_LOOKUP_COMMAND),
                Effect::PersistSsid(ssid) => {
                    if let Err(e) = self.store.set_string(LAST_CONNECTED_WIFI_KEY, ssid.as_deref()) {
                        warn!("Could not persist last connected Wi-Fi: {e}");
                    }
                }
                Effect::Render(snapshot) => self.notify(TileUpdate::SnapshotChanged(snapshot)),
                Effect::PrivilegedAccessRequired => self.notify(TileUpdate::PrivilegedAccessRequired),
            }
        }
        controller
    }

    async fn resync(&mut self, controller: TransitionController) -> TransitionController {
        let ground = read_ground_truth(&self.platform).await;
        self.feed(controller, Input::Synced(ground))
    }

    /// Locked while the user asked for cycles to wait for an unlock
    async fn locked_out(&self) -> bool {
        if !self.store.get_bool(REQUIRE_UNLOCK_KEY, true) {
            return false;
        }
        let platform = Arc::clone(&self.platform);
        tokio::task::spawn_blocking(move || platform.is_locked())
            .await
            .unwrap_or(false)
    }

    async fn has_access(&self) -> bool {
        let shell = Arc::clone(&self.shell);
        tokio::task::spawn_blocking(move || shell.has_access())
            .await
            .unwrap_or(false)
    }

    async fn click(&mut self, controller: TransitionController) -> TransitionController {
        if !self.has_access().await {
            return self.feed(controller, Input::CycleRequested { privileged: false });
        }
        if self.locked_out().await {
            info!("Device locked, deferring cycle until unlock");
            self.deferred_cycle = true;
            self.notify(TileUpdate::UnlockRequired);
            return controller;
        }
        self.cycle(controller).await
    }

    async fn cycle(&mut self, controller: TransitionController) -> TransitionController {
        let controller = self.resync(controller).await;
        let privileged = self.has_access().await;
        self.feed(controller, Input::CycleRequested { privileged })
    }

    fn long_press(&self, controller: &TransitionController) {
        let target = SettingsTarget::for_ground_truth(controller.snapshot().ground_truth());
        info!("Opening {target:?} settings");
        self.executor
            .submit(Job::OpenSettings(target), target.shell_command());
        self.notify(TileUpdate::OpenSettings(target));
    }

    fn complete(&mut self, controller: TransitionController, completion: Completion<Job>) -> TransitionController {
        let success = completion.succeeded();
        match completion.tag {
            Job::Toggle(ticket) => self.feed(controller, Input::CommandCompleted { ticket, success }),
            Job::ResolveSsid => {
                let ssid = completion
                    .result
                    .ok()
                    .filter(|output| output.is_success())
                    .and_then(|output| ssid_from_netstats(&output.stdout));
                debug!("SSID lookup finished: {ssid:?}");
                self.feed(controller, Input::SsidResolved(ssid))
            }
            Job::OpenSettings(target) => {
                if !success {
                    warn!("Could not open {target:?} settings via `{}`", completion.command);
                }
                controller
            }
        }
    }
}
