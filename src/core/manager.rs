//! Wifi manager: interface registry, discovery aggregation and coarse status

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::WlanBackend;
use crate::core::access_point::AccessPoint;
use crate::core::error::WlanResult;
use crate::core::interface::Interface;
use crate::core::types::{
    InterfaceId, NetworkSignature, NotificationCode, NotificationSource, WifiStatus,
    WlanNotification,
};

/// Owns the known interfaces and aggregates discovery across them.
///
/// The interface set is rebuilt on every enumeration: handles for vanished
/// interfaces are dropped, new ones created, and surviving interfaces keep
/// their handle (identity is the native GUID).
///
/// The coarse connection status is a best-effort cache: computed once on
/// first read, then updated only from notification events. It can go stale
/// when notifications are missed; that approximation is accepted.
pub struct WifiManager<B: WlanBackend> {
    backend: Arc<B>,
    interfaces: RwLock<HashMap<InterfaceId, Arc<Interface<B>>>>,
    status: Arc<RwLock<Option<WifiStatus>>>,
    status_tx: broadcast::Sender<WifiStatus>,
    watcher: JoinHandle<()>,
}

impl<B: WlanBackend> WifiManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (status_tx, _) = broadcast::channel(16);
        let status = Arc::new(RwLock::new(None));
        let watcher = tokio::spawn(watch_status(
            backend.subscribe(),
            status.clone(),
            status_tx.clone(),
        ));

        Self {
            backend,
            interfaces: RwLock::new(HashMap::new()),
            status,
            status_tx,
            watcher,
        }
    }

    /// Re-enumerate interfaces, preserving handles for survivors.
    pub async fn interfaces(&self) -> WlanResult<Vec<Arc<Interface<B>>>> {
        let infos = self.backend.interfaces().await?;
        let mut known = self.interfaces.write().await;

        let mut next = HashMap::with_capacity(infos.len());
        for info in infos {
            let handle = known
                .remove(&info.id)
                .unwrap_or_else(|| Arc::new(Interface::new(self.backend.clone(), info.clone())));
            next.insert(info.id, handle);
        }
        *known = next;

        Ok(known.values().cloned().collect())
    }

    /// Discover access points across all interfaces.
    ///
    /// Entries sharing an equality signature (SSID, BSS type, security) are
    /// collapsed: an entry without a stored-profile name is dropped when
    /// another entry with the same signature carries one; everything else is
    /// kept. The result is not sorted; ordering by signal strength is the
    /// caller's concern.
    pub async fn access_points(&self) -> WlanResult<Vec<AccessPoint<B>>> {
        let interfaces = self.interfaces().await?;

        let mut found = Vec::new();
        for interface in interfaces {
            for network in interface.networks().await? {
                found.push((interface.clone(), network));
            }
        }

        let named: HashSet<NetworkSignature> = found
            .iter()
            .filter(|(_, network)| network.profile_name.is_some())
            .map(|(_, network)| network.signature())
            .collect();
        found.retain(|(_, network)| {
            network.profile_name.is_some() || !named.contains(&network.signature())
        });

        Ok(found
            .into_iter()
            .map(|(interface, network)| AccessPoint::new(interface, network))
            .collect())
    }

    /// Request a scan on every interface. Failures propagate: the caller
    /// explicitly asked for fresh results.
    pub async fn scan_all(&self) -> WlanResult<()> {
        for interface in self.interfaces().await? {
            interface.scan().await?;
        }
        Ok(())
    }

    /// Best-effort disconnect on every interface. Continues past failures to
    /// disconnect as many interfaces as possible.
    pub async fn disconnect_all(&self) -> WlanResult<()> {
        for interface in self.interfaces().await? {
            if let Err(error) = interface.disconnect().await {
                warn!(interface = %interface.id(), %error, "disconnect failed");
            }
        }
        Ok(())
    }

    /// Coarse cached status. The first read polls every interface; later
    /// reads return the cache, which notification events keep updated.
    pub async fn connection_status(&self) -> WlanResult<WifiStatus> {
        if let Some(cached) = *self.status.read().await {
            return Ok(cached);
        }

        let polled = self.poll_status().await?;
        let mut cached = self.status.write().await;
        // an event may have raced the poll; the event wins
        Ok(*cached.get_or_insert(polled))
    }

    /// Subscribe to status-change events.
    pub fn subscribe_status(&self) -> broadcast::Receiver<WifiStatus> {
        self.status_tx.subscribe()
    }

    async fn poll_status(&self) -> WlanResult<WifiStatus> {
        for interface in self.interfaces().await? {
            // per-interface query failures read as "not connected"
            if let Ok(Some(_)) = interface.current_connection().await {
                return Ok(WifiStatus::Connected);
            }
        }
        Ok(WifiStatus::Disconnected)
    }
}

impl<B: WlanBackend> Drop for WifiManager<B> {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

/// Track ACM connection notifications into the status cache.
async fn watch_status(
    mut events: broadcast::Receiver<WlanNotification>,
    status: Arc<RwLock<Option<WifiStatus>>>,
    status_tx: broadcast::Sender<WifiStatus>,
) {
    loop {
        let notification = match events.recv().await {
            Ok(notification) => notification,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "status watcher lagged behind notifications");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if notification.source != NotificationSource::Acm {
            continue;
        }
        let new_status = match notification.code {
            NotificationCode::ConnectionComplete => WifiStatus::Connected,
            NotificationCode::Disconnected => WifiStatus::Disconnected,
            _ => continue,
        };

        *status.write().await = Some(new_status);
        let _ = status_tx.send(new_status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::simulated::{BackendCall, SimulatedBackend};
    use crate::core::types::{
        AuthAlgorithm, BssType, CipherAlgorithm, NetworkDescriptor, Ssid,
    };
    use pretty_assertions::assert_eq;

    fn network(ssid: &str, profile: Option<&str>) -> NetworkDescriptor {
        NetworkDescriptor {
            ssid: Ssid::from(ssid),
            bss_type: BssType::Infrastructure,
            security_enabled: true,
            auth: AuthAlgorithm::RsnaPsk,
            cipher: CipherAlgorithm::Ccmp,
            signal_quality: 50,
            connectable: true,
            not_connectable_reason: None,
            profile_name: profile.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn duplicate_entry_with_profile_name_wins() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        backend.add_network(interface, network("Office", None)).await;
        backend
            .add_network(interface, network("Office", Some("Office")))
            .await;

        let manager = WifiManager::new(Arc::new(backend));
        let access_points = manager.access_points().await.unwrap();

        assert_eq!(access_points.len(), 1);
        assert_eq!(
            access_points[0].network().profile_name.as_deref(),
            Some("Office")
        );
    }

    #[tokio::test]
    async fn unrelated_entries_are_all_kept() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        backend.add_network(interface, network("Office", None)).await;
        backend.add_network(interface, network("Guest", None)).await;
        let mut adhoc = network("Office", None);
        adhoc.bss_type = BssType::Independent;
        backend.add_network(interface, adhoc).await;

        let manager = WifiManager::new(Arc::new(backend));
        assert_eq!(manager.access_points().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicates_without_any_profile_name_are_kept() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        backend.add_network(interface, network("Office", None)).await;
        backend.add_network(interface, network("Office", None)).await;

        let manager = WifiManager::new(Arc::new(backend));
        assert_eq!(manager.access_points().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn interface_handles_survive_re_enumeration() {
        let backend = SimulatedBackend::new();
        backend.add_interface("card").await;
        let manager = WifiManager::new(Arc::new(backend));

        let first = manager.interfaces().await.unwrap();
        let second = manager.interfaces().await.unwrap();
        assert!(Arc::ptr_eq(&first[0], &second[0]));
    }

    #[tokio::test]
    async fn first_status_read_polls_interfaces() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        backend.set_connected(interface, "Office").await;

        let manager = WifiManager::new(Arc::new(backend));
        assert_eq!(
            manager.connection_status().await.unwrap(),
            WifiStatus::Connected
        );
    }

    #[tokio::test]
    async fn status_without_any_connection_is_disconnected() {
        let backend = SimulatedBackend::new();
        backend.add_interface("card").await;

        let manager = WifiManager::new(Arc::new(backend));
        assert_eq!(
            manager.connection_status().await.unwrap(),
            WifiStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn notifications_flip_the_cached_status() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        let manager = WifiManager::new(Arc::new(backend.clone()));
        let mut changes = manager.subscribe_status();

        assert_eq!(
            manager.connection_status().await.unwrap(),
            WifiStatus::Disconnected
        );

        backend.emit(WlanNotification::connection_complete(interface, "Office"));
        assert_eq!(changes.recv().await.unwrap(), WifiStatus::Connected);
        assert_eq!(
            manager.connection_status().await.unwrap(),
            WifiStatus::Connected
        );

        backend.emit(WlanNotification::disconnected(interface, "Office"));
        assert_eq!(changes.recv().await.unwrap(), WifiStatus::Disconnected);
        assert_eq!(
            manager.connection_status().await.unwrap(),
            WifiStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn msm_notifications_do_not_change_status() {
        let backend = SimulatedBackend::new();
        let interface = backend.add_interface("card").await;
        let manager = WifiManager::new(Arc::new(backend.clone()));
        let mut changes = manager.subscribe_status();

        backend.emit(WlanNotification {
            interface,
            source: NotificationSource::Msm,
            code: NotificationCode::ConnectionComplete,
            profile_name: Some("Office".into()),
        });
        backend.emit(WlanNotification::connection_complete(interface, "Office"));

        // only the ACM event comes through
        assert_eq!(changes.recv().await.unwrap(), WifiStatus::Connected);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_all_continues_past_failures() {
        let backend = SimulatedBackend::new();
        let first = backend.add_interface("first").await;
        let second = backend.add_interface("second").await;
        backend.set_connected(first, "Office").await;
        backend.set_connected(second, "Guest").await;
        backend.set_disconnect_failure(true).await;

        let manager = WifiManager::new(Arc::new(backend.clone()));
        manager.disconnect_all().await.unwrap();

        let disconnects = backend
            .calls()
            .await
            .into_iter()
            .filter(|call| matches!(call, BackendCall::Disconnect { .. }))
            .count();
        assert_eq!(disconnects, 2);
    }

    #[tokio::test]
    async fn scan_all_reaches_every_interface() {
        let backend = SimulatedBackend::new();
        backend.add_interface("card").await;
        let manager = WifiManager::new(Arc::new(backend.clone()));

        manager.scan_all().await.unwrap();
        assert!(
            backend
                .calls()
                .await
                .iter()
                .any(|call| matches!(call, BackendCall::Scan { .. }))
        );
    }
}
