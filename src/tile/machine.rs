use log::{debug, info, warn};

use crate::network::{LinkPayload, NetworkEvent, ObservedEvent, Transport};
use crate::platform::GroundTruth;
use crate::tile::command::{Ticket, ToggleCommand};
use crate::tile::state::{ControllerSnapshot, Mode, TransportState};
use crate::traits::MealyMachine;

// ─── Input alphabet ─────────────────────────────────────────────────────────

/// Everything that can happen to the controller. Inputs are produced by the
/// observer, the command executor, the user and the periodic ground-truth
/// sync, and are fed to the machine one at a time by the tile service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Fresh OS-reported enabled state of both transports
    Synced(GroundTruth),
    Observed(ObservedEvent),
    CycleRequested { privileged: bool },
    CommandCompleted { ticket: Ticket, success: bool },
    /// Outcome of a privileged SSID lookup
    SsidResolved(Option<String>),
}

// ─── Output alphabet ────────────────────────────────────────────────────────

/// Side effects requested by the controller; the service executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit(Ticket),
    ResolveSsid,
    PersistSsid(Option<String>),
    Render(ControllerSnapshot),
    PrivilegedAccessRequired,
}

// ─── Controller ─────────────────────────────────────────────────────────────

/// The internet-mode cycling state machine.
///
/// Owns the pending flags of both transports. Enabled flags only ever come
/// from ground truth; the pending flags record intent while a toggle is in
/// flight. A pending flag is dropped when ground truth confirms the
/// transport or when the enable command of the current generation fails.
/// A successful enable keeps the flag up until the next ground-truth sync,
/// so the tile never drops to inactive between the command returning and
/// the OS reporting the transport. Completions from an older generation are
/// ignored, so a newer cycle always wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionController {
    snapshot: ControllerSnapshot,
    rendered: Option<ControllerSnapshot>,
    /// Transport whose enable succeeded and whose flag falls on the next sync
    settle_on_sync: Option<Transport>,
}

impl TransitionController {
    /// Begin a listening session from the current ground truth.
    ///
    /// The last known SSID is only carried over while Wi-Fi is enabled.
    pub fn start(ground: GroundTruth, last_known_ssid: Option<String>) -> Self {
        let mut snapshot = ControllerSnapshot::default();
        snapshot.wifi.enabled = ground.wifi_enabled;
        snapshot.cellular.enabled = ground.data_enabled;
        if ground.wifi_enabled {
            snapshot.wifi_identity.ssid = last_known_ssid;
        }
        Self {
            snapshot,
            rendered: None,
            settle_on_sync: None,
        }
    }

    pub fn snapshot(&self) -> &ControllerSnapshot {
        &self.snapshot
    }

    pub fn mode(&self) -> Mode {
        self.snapshot.mode()
    }

    fn transport_mut(&mut self, transport: Transport) -> &mut TransportState {
        match transport {
            Transport::Wifi => &mut self.snapshot.wifi,
            Transport::Cellular => &mut self.snapshot.cellular,
        }
    }

    fn sync(&mut self, ground: GroundTruth) -> Vec<Effect> {
        self.snapshot.wifi.enabled = ground.wifi_enabled;
        self.snapshot.cellular.enabled = ground.data_enabled;

        let settled = self.settle_on_sync.take();
        for transport in [Transport::Wifi, Transport::Cellular] {
            let state = self.transport_mut(transport);
            if !state.pending_enable {
                continue;
            }
            if state.enabled {
                state.pending_enable = false;
                debug!("{transport} confirmed enabled");
            } else if settled == Some(transport) {
                state.pending_enable = false;
                debug!("{transport} still reported off after enabling; following ground truth");
            }
        }
        Vec::new()
    }

    fn cycle(&mut self, privileged: bool) -> Vec<Effect> {
        if !privileged {
            info!("Cycle refused: privileged access required");
            return vec![Effect::PrivilegedAccessRequired];
        }

        // The plan follows what is actually enabled, not what is pending.
        let target = match self.snapshot.wifi.enabled {
            true => Transport::Cellular,
            false => Transport::Wifi,
        };
        let plan = match self.snapshot.transport(target.other()).enabled {
            true => vec![ToggleCommand::disable(target.other()), ToggleCommand::enable(target)],
            false => vec![ToggleCommand::enable(target)],
        };

        let mode = self.mode();
        let generation = self.snapshot.generation.next();
        self.snapshot.generation = generation;
        self.snapshot.wifi.pending_enable = false;
        self.snapshot.cellular.pending_enable = false;
        self.transport_mut(target).pending_enable = true;
        self.settle_on_sync = None;

        info!("Cycling from {mode} towards {target} (generation {generation})");

        plan.into_iter()
            .map(|command| Effect::Submit(Ticket {
                generation,
                command,
            }))
            .collect()
    }

    fn complete(&mut self, ticket: Ticket, success: bool) -> Vec<Effect> {
        if ticket.generation != self.snapshot.generation {
            debug!(
                "Ignoring stale completion of `{}` from generation {} (current {})",
                ticket.command, ticket.generation, self.snapshot.generation
            );
            return Vec::new();
        }

        if !ticket.command.is_enable() {
            if !success {
                warn!("`{}` failed; not retrying", ticket.command);
            }
            return Vec::new();
        }

        let transport = ticket.command.transport();
        if !self.transport_mut(transport).pending_enable {
            return Vec::new();
        }
        match success {
            true => {
                debug!("`{}` completed; waiting for ground truth", ticket.command);
                self.settle_on_sync = Some(transport);
            }
            false => {
                info!("`{}` failed; falling back to ground truth", ticket.command);
                self.transport_mut(transport).pending_enable = false;
            }
        }
        Vec::new()
    }

    fn observe(&mut self, observed: ObservedEvent) -> Vec<Effect> {
        let ObservedEvent { transport, event } = observed;
        match (transport, event) {
            (Transport::Wifi, NetworkEvent::Available(LinkPayload::Wifi(detail))) => {
                let identity = &mut self.snapshot.wifi_identity;
                identity.connected = true;
                self.snapshot.wifi_signal = detail.signal;
                match detail.ssid {
                    Some(ssid) => {
                        identity.ssid = Some(ssid.clone());
                        vec![Effect::PersistSsid(Some(ssid))]
                    }
                    None => vec![Effect::ResolveSsid],
                }
            }
            (Transport::Wifi, NetworkEvent::Changed(LinkPayload::Wifi(detail))) => {
                self.snapshot.wifi_signal = detail.signal;
                let identity = &mut self.snapshot.wifi_identity;
                match detail.ssid {
                    Some(ssid) if identity.ssid.as_deref() != Some(ssid.as_str()) => {
                        identity.ssid = Some(ssid.clone());
                        vec![Effect::PersistSsid(Some(ssid))]
                    }
                    _ => Vec::new(),
                }
            }
            (Transport::Wifi, NetworkEvent::Lost) => {
                self.snapshot.wifi_identity.connected = false;
                self.snapshot.wifi_identity.ssid = None;
                self.snapshot.wifi_signal = None;
                vec![Effect::PersistSsid(None)]
            }
            (
                Transport::Cellular,
                NetworkEvent::Available(LinkPayload::Cellular(info))
                | NetworkEvent::Changed(LinkPayload::Cellular(info)),
            ) => {
                self.snapshot.cellular_display = info;
                Vec::new()
            }
            (Transport::Cellular, NetworkEvent::Lost) => Vec::new(),
            (transport, event) => {
                warn!("Dropping {transport} event with mismatched payload: {event:?}");
                Vec::new()
            }
        }
    }

    fn resolve_ssid(&mut self, ssid: Option<String>) -> Vec<Effect> {
        let identity = &mut self.snapshot.wifi_identity;
        if !identity.connected {
            debug!("Wi-Fi disconnected before SSID lookup finished");
            return Vec::new();
        }
        identity.ssid = ssid.clone();
        vec![Effect::PersistSsid(ssid)]
    }
}

impl MealyMachine for TransitionController {
    type Input = Input;
    type Output = Effect;

    fn transition(mut self, input: Input) -> (Self, Vec<Effect>) {
        let mut effects = match input {
            Input::Synced(ground) => self.sync(ground),
            Input::Observed(observed) => self.observe(observed),
            Input::CycleRequested { privileged } => self.cycle(privileged),
            Input::CommandCompleted { ticket, success } => self.complete(ticket, success),
            Input::SsidResolved(ssid) => self.resolve_ssid(ssid),
        };

        if self.rendered.as_ref() != Some(&self.snapshot) {
            self.rendered = Some(self.snapshot.clone());
            effects.push(Effect::Render(self.snapshot.clone()));
        }
        (self, effects)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
