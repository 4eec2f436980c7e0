//! Per-interface operations and the connect notification reconciler

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast::error::RecvError};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::backend::WlanBackend;
use crate::core::error::{ConnectError, ConnectResult, WlanResult};
use crate::core::types::{
    BssType, ConnectionMode, CurrentConnection, InterfaceId, InterfaceInfo, NetworkDescriptor,
    NotificationCode, NotificationSource, ProfileScope,
};

/// One wireless interface, bound to its backend.
///
/// Handles are created by the manager during enumeration and keep their
/// identity for as long as the OS reports the interface.
pub struct Interface<B> {
    backend: Arc<B>,
    info: InterfaceInfo,
    // serializes synchronous connects on this interface
    connect_gate: Mutex<()>,
}

impl<B: WlanBackend> Interface<B> {
    pub(crate) fn new(backend: Arc<B>, info: InterfaceInfo) -> Self {
        Self {
            backend,
            info,
            connect_gate: Mutex::new(()),
        }
    }

    pub fn id(&self) -> InterfaceId {
        self.info.id
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn info(&self) -> &InterfaceInfo {
        &self.info
    }

    pub async fn networks(&self) -> WlanResult<Vec<NetworkDescriptor>> {
        self.backend.networks(self.info.id).await
    }

    pub async fn current_connection(&self) -> WlanResult<Option<CurrentConnection>> {
        self.backend.current_connection(self.info.id).await
    }

    pub async fn profile_names(&self) -> WlanResult<Vec<String>> {
        self.backend.profile_names(self.info.id).await
    }

    pub async fn profile_xml(&self, name: &str) -> WlanResult<Option<String>> {
        self.backend.profile_xml(self.info.id, name).await
    }

    pub async fn set_profile(
        &self,
        scope: ProfileScope,
        xml: &str,
        overwrite: bool,
    ) -> WlanResult<()> {
        self.backend
            .set_profile(self.info.id, scope, xml, overwrite)
            .await
    }

    pub async fn delete_profile(&self, name: &str) -> WlanResult<()> {
        self.backend.delete_profile(self.info.id, name).await
    }

    pub async fn set_eap_credentials(&self, profile: &str, user_xml: &str) -> WlanResult<()> {
        self.backend
            .set_eap_credentials(self.info.id, profile, user_xml)
            .await
    }

    pub async fn disconnect(&self) -> WlanResult<()> {
        self.backend.disconnect(self.info.id).await
    }

    pub async fn scan(&self) -> WlanResult<()> {
        self.backend.scan(self.info.id).await
    }

    /// Issue a connect request and block until the OS reports completion for
    /// the requested profile, or the timeout elapses.
    ///
    /// The notification stream is subscribed before the connect request goes
    /// out, so a completion arriving immediately is never missed. Events for
    /// other interfaces, other sources or other profiles are discarded; the
    /// subscription is dropped on return so later events cannot be
    /// misattributed to a finished attempt. Connects on the same interface
    /// are serialized through an internal lock.
    pub async fn connect_with_timeout(
        &self,
        bss: BssType,
        profile: &str,
        timeout: Duration,
    ) -> ConnectResult<()> {
        let _gate = self.connect_gate.lock().await;

        let mut events = self.backend.subscribe();
        self.backend
            .connect(self.info.id, ConnectionMode::Profile, bss, profile)
            .await?;
        debug!(interface = %self.info.id, profile, "connect issued, awaiting completion");

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ConnectError::Timeout(timeout));
            }

            match tokio::time::timeout(remaining, events.recv()).await {
                Err(_elapsed) => return Err(ConnectError::Timeout(timeout)),
                Ok(Err(RecvError::Closed)) => return Err(ConnectError::Timeout(timeout)),
                Ok(Err(RecvError::Lagged(skipped))) => {
                    trace!(skipped, "notification stream lagged");
                }
                Ok(Ok(notification)) => {
                    if notification.interface == self.info.id
                        && notification.source == NotificationSource::Acm
                        && notification.code == NotificationCode::ConnectionComplete
                        && notification.profile_name.as_deref() == Some(profile)
                    {
                        debug!(interface = %self.info.id, profile, "connection complete");
                        return Ok(());
                    }
                    trace!(?notification, "ignoring unrelated notification");
                }
            }
        }
    }
}
