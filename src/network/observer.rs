use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{TileError, TileResult};
use crate::network::types::{LinkPayload, NetworkEvent, ObservedEvent, Transport};
use crate::platform::Platform;

/// Turn two successive link readings into at most one event.
///
/// `None` means the transport is unreachable. Identical readings produce
/// nothing; every other change produces exactly one event.
pub fn normalize(previous: Option<&LinkPayload>, current: Option<&LinkPayload>) -> Option<NetworkEvent> {
    match (previous, current) {
        (None, Some(now)) => Some(NetworkEvent::Available(now.clone())),
        (Some(_), None) => Some(NetworkEvent::Lost),
        (Some(before), Some(now)) if before != now => Some(NetworkEvent::Changed(now.clone())),
        _ => None,
    }
}

fn read_link(platform: &dyn Platform, transport: Transport) -> TileResult<Option<LinkPayload>> {
    match transport {
        Transport::Wifi => Ok(platform
            .wifi_link()?
            .map(|link| LinkPayload::Wifi(link.detail()))),
        Transport::Cellular => {
            let permitted = platform.has_carrier_info_permission();
            Ok(platform
                .cellular_link()?
                .map(|link| LinkPayload::Cellular(link.display_info(permitted))))
        }
    }
}

async fn watch(
    transport: Transport,
    platform: Arc<dyn Platform>,
    period: Duration,
    sender: UnboundedSender<ObservedEvent>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut previous: Option<LinkPayload> = None;

    loop {
        ticker.tick().await;

        let source = Arc::clone(&platform);
        let reading = tokio::task::spawn_blocking(move || read_link(source.as_ref(), transport))
            .await
            .unwrap_or_else(|e| Err(TileError::Internal(e.to_string())));

        let current = match reading {
            Ok(current) => current,
            Err(e) => {
                warn!("Could not read {transport} link state: {e}");
                continue;
            }
        };

        if let Some(event) = normalize(previous.as_ref(), current.as_ref()) {
            debug!("{transport} event: {event:?}");
            if sender.send(ObservedEvent { transport, event }).is_err() {
                debug!("{transport} event receiver dropped, stopping watch");
                return;
            }
        }
        previous = current;
    }
}

/// Watches both transports and reports normalized events.
///
/// Each transport has at most one active subscription; stopping it (or
/// dropping the observer) cancels the watch task.
pub struct NetworkObserver {
    platform: Arc<dyn Platform>,
    period: Duration,
    wifi: Option<JoinHandle<()>>,
    cellular: Option<JoinHandle<()>>,
}

impl NetworkObserver {
    pub fn new(platform: Arc<dyn Platform>, period: Duration) -> Self {
        Self {
            platform,
            period,
            wifi: None,
            cellular: None,
        }
    }

    fn slot(&mut self, transport: Transport) -> &mut Option<JoinHandle<()>> {
        match transport {
            Transport::Wifi => &mut self.wifi,
            Transport::Cellular => &mut self.cellular,
        }
    }

    pub fn is_listening(&self, transport: Transport) -> bool {
        let handle = match transport {
            Transport::Wifi => &self.wifi,
            Transport::Cellular => &self.cellular,
        };
        handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start watching `transport`. The first reading of a reachable
    /// transport is reported as `Available`.
    pub fn start_listening(
        &mut self,
        transport: Transport,
        sender: UnboundedSender<ObservedEvent>,
    ) -> TileResult<()> {
        if self.is_listening(transport) {
            return Err(TileError::AlreadyListening(transport));
        }
        let platform = Arc::clone(&self.platform);
        let period = self.period;
        *self.slot(transport) = Some(tokio::spawn(watch(transport, platform, period, sender)));
        info!("Listening for {transport} changes");
        Ok(())
    }

    /// Returns whether a subscription was active
    pub fn stop_listening(&mut self, transport: Transport) -> bool {
        match self.slot(transport).take() {
            Some(handle) => {
                handle.abort();
                info!("Stopped listening for {transport} changes");
                true
            }
            None => false,
        }
    }
}

impl Drop for NetworkObserver {
    fn drop(&mut self) {
        for handle in [self.wifi.take(), self.cellular.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{CellularDisplayInfo, SignalLevel, WifiDetail};
    use crate::platform::{DeviceState, SimulatedDevice};
    use tokio::sync::mpsc;

    fn wifi(ssid: &str, level: u8) -> LinkPayload {
        LinkPayload::Wifi(WifiDetail {
            ssid: Some(ssid.to_string()),
            signal: Some(SignalLevel::new(level)),
        })
    }

    #[test]
    fn appearance_is_available() {
        let now = wifi("HomeNet", 3);
        assert_eq!(normalize(None, Some(&now)), Some(NetworkEvent::Available(now.clone())));
    }

    #[test]
    fn disappearance_is_lost() {
        let before = wifi("HomeNet", 3);
        assert_eq!(normalize(Some(&before), None), Some(NetworkEvent::Lost));
    }

    #[test]
    fn detail_change_is_changed() {
        let before = wifi("HomeNet", 3);
        let now = wifi("HomeNet", 1);
        assert_eq!(
            normalize(Some(&before), Some(&now)),
            Some(NetworkEvent::Changed(now.clone()))
        );
    }

    #[test]
    fn steady_state_is_silent() {
        let cell = LinkPayload::Cellular(CellularDisplayInfo::default());
        assert_eq!(normalize(Some(&cell), Some(&cell)), None);
        assert_eq!(normalize(None, None), None);
    }

    #[tokio::test]
    async fn double_registration_is_rejected() {
        let device = Arc::new(SimulatedDevice::new(DeviceState::default()));
        let mut observer = NetworkObserver::new(device, Duration::from_millis(10));
        let (tx, _rx) = mpsc::unbounded_channel();

        observer.start_listening(Transport::Wifi, tx.clone()).unwrap();
        assert!(matches!(
            observer.start_listening(Transport::Wifi, tx.clone()),
            Err(TileError::AlreadyListening(Transport::Wifi))
        ));
        observer.start_listening(Transport::Cellular, tx.clone()).unwrap();

        assert!(observer.stop_listening(Transport::Wifi));
        assert!(!observer.stop_listening(Transport::Wifi));
        observer.start_listening(Transport::Wifi, tx).unwrap();
    }

    #[tokio::test]
    async fn reachable_wifi_is_reported_then_lost() {
        let device = Arc::new(SimulatedDevice::new(DeviceState {
            wifi_enabled: true,
            ..DeviceState::default()
        }));
        let mut observer = NetworkObserver::new(device.clone(), Duration::from_millis(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        observer.start_listening(Transport::Wifi, tx).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.transport, Transport::Wifi);
        match first.event {
            NetworkEvent::Available(LinkPayload::Wifi(detail)) => {
                assert_eq!(detail.ssid.as_deref(), Some("HomeNet"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        device.set_wifi_enabled(false);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event, NetworkEvent::Lost);
    }

    #[tokio::test]
    async fn carrier_is_hidden_without_permission() {
        let device = Arc::new(SimulatedDevice::new(DeviceState {
            data_enabled: true,
            carrier_permission: false,
            ..DeviceState::default()
        }));
        let mut observer = NetworkObserver::new(device, Duration::from_millis(10));
        let (tx, mut rx) = mpsc::unbounded_channel();
        observer.start_listening(Transport::Cellular, tx).unwrap();

        match rx.recv().await.unwrap().event {
            NetworkEvent::Available(LinkPayload::Cellular(info)) => assert_eq!(info.carrier, None),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
