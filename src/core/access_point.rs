//! Access points: one discovered network entry bound to its interface

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::WlanBackend;
use crate::core::auth_request::AuthRequest;
use crate::core::error::{ConnectError, ConnectResult, WlanResult};
use crate::core::interface::Interface;
use crate::core::types::NetworkDescriptor;
use crate::profile::password;

/// Default budget for a synchronous connect attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(6000);

/// One discovered network entry, bound to the interface that reported it.
///
/// Constructed fresh on every discovery pass and never mutated; a newer scan
/// supersedes older instances.
pub struct AccessPoint<B> {
    interface: Arc<Interface<B>>,
    network: NetworkDescriptor,
}

impl<B> Clone for AccessPoint<B> {
    fn clone(&self) -> Self {
        Self {
            interface: self.interface.clone(),
            network: self.network.clone(),
        }
    }
}

impl<B: WlanBackend> AccessPoint<B> {
    pub(crate) fn new(interface: Arc<Interface<B>>, network: NetworkDescriptor) -> Self {
        Self { interface, network }
    }

    /// Decoded SSID, also used as the profile name.
    pub fn name(&self) -> String {
        self.network.ssid.name()
    }

    /// Signal quality percentage, 0-100.
    pub fn signal_strength(&self) -> u8 {
        self.network.signal_quality
    }

    pub fn is_secure(&self) -> bool {
        self.network.security_enabled
    }

    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    pub fn interface(&self) -> &Arc<Interface<B>> {
        &self.interface
    }

    /// Whether a stored profile by this access point's name exists.
    ///
    /// Query failures count as "no profile": the interface may be in a
    /// transient state and the answer is only used to decide whether a
    /// profile must be created.
    pub async fn has_profile(&self) -> bool {
        let name = self.name();
        match self.interface.profile_names().await {
            Ok(names) => names.iter().any(|stored| *stored == name),
            Err(error) => {
                debug!(%error, "profile list unavailable, assuming no profile");
                false
            }
        }
    }

    /// Whether the interface's current connection uses this entry's profile.
    ///
    /// No current connection means "not connected", never an error.
    pub async fn is_connected(&self) -> bool {
        let connection = match self.interface.current_connection().await {
            Ok(connection) => connection,
            Err(error) => {
                debug!(%error, "current connection unavailable, assuming disconnected");
                None
            }
        };
        match (connection, &self.network.profile_name) {
            (Some(current), Some(profile)) => current.profile_name == *profile,
            _ => false,
        }
    }

    /// Check a password against this network's cipher rules.
    pub fn is_valid_password(&self, candidate: &str) -> bool {
        password::is_valid(candidate, self.network.cipher)
    }

    /// The stored profile document for this access point, if any.
    pub async fn profile_xml(&self) -> WlanResult<Option<String>> {
        self.interface.profile_xml(&self.name()).await
    }

    /// Remove the stored profile. Best effort: the profile may legitimately
    /// not exist.
    pub async fn delete_profile(&self) {
        let name = self.name();
        if let Err(error) = self.interface.delete_profile(&name).await {
            warn!(%name, %error, "profile removal failed");
        }
    }

    /// Connect with the default timeout. See [`AccessPoint::connect_with`].
    pub async fn connect(
        &self,
        request: &AuthRequest<B>,
        overwrite_profile: bool,
    ) -> ConnectResult<bool> {
        self.connect_with(request, overwrite_profile, CONNECT_TIMEOUT)
            .await
    }

    /// Connect synchronously, creating or replacing the stored profile when
    /// needed.
    ///
    /// Fails fast with `Ok(false)` when a required password is invalid and a
    /// profile would have to be (re)created. Open networks skip profile
    /// creation and connect directly. A timeout is an ordinary `Ok(false)`
    /// outcome; backend failures surface as errors.
    pub async fn connect_with(
        &self,
        request: &AuthRequest<B>,
        overwrite_profile: bool,
        timeout: Duration,
    ) -> ConnectResult<bool> {
        let has_profile = self.has_profile().await;
        let needs_profile = !has_profile || overwrite_profile;

        if request.is_password_required() && !request.is_password_valid() && needs_profile {
            debug!(name = %self.name(), "rejecting connect, password invalid");
            return Ok(false);
        }

        if needs_profile && request.is_password_required() {
            if has_profile {
                self.delete_profile().await;
            }
            if !request.process().await? {
                return Ok(false);
            }
        }

        match self
            .interface
            .connect_with_timeout(self.network.bss_type, &self.name(), timeout)
            .await
        {
            Ok(()) => Ok(true),
            Err(ConnectError::Timeout(elapsed)) => {
                debug!(name = %self.name(), ?elapsed, "connect attempt timed out");
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Connect on a background task and report the outcome through the
    /// callback, which is invoked exactly once. Backend failures are folded
    /// into `false`; the attempt cannot be cancelled.
    pub fn connect_background<F>(&self, request: AuthRequest<B>, overwrite_profile: bool, on_complete: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let access_point = self.clone();
        tokio::spawn(async move {
            let success = match access_point.connect(&request, overwrite_profile).await {
                Ok(success) => success,
                Err(error) => {
                    warn!(name = %access_point.name(), %error, "background connect failed");
                    false
                }
            };
            on_complete(success);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::simulated::{BackendCall, SimulatedBackend};
    use crate::core::manager::WifiManager;
    use crate::core::types::{AuthAlgorithm, BssType, CipherAlgorithm, Ssid};
    use pretty_assertions::assert_eq;

    fn network(cipher: CipherAlgorithm, auth: AuthAlgorithm) -> NetworkDescriptor {
        NetworkDescriptor {
            ssid: Ssid::from("Office"),
            bss_type: BssType::Infrastructure,
            security_enabled: cipher != CipherAlgorithm::None,
            auth,
            cipher,
            signal_quality: 70,
            connectable: true,
            not_connectable_reason: None,
            profile_name: None,
        }
    }

    async fn access_point(
        backend: &SimulatedBackend,
        network: NetworkDescriptor,
    ) -> AccessPoint<SimulatedBackend> {
        let id = backend.add_interface("card").await;
        backend.add_network(id, network).await;
        WifiManager::new(Arc::new(backend.clone()))
            .access_points()
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn profile_query_failure_reads_as_no_profile() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        backend
            .insert_profile(ap.interface().id(), "Office", "<xml/>")
            .await;

        assert!(ap.has_profile().await);
        backend.set_profile_query_failure(true).await;
        assert!(!ap.has_profile().await);
    }

    #[tokio::test]
    async fn connection_state_compares_profile_names() {
        let backend = SimulatedBackend::new();
        let mut described = network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk);
        described.profile_name = Some("Office".into());
        let ap = access_point(&backend, described).await;

        assert!(!ap.is_connected().await);
        backend.set_connected(ap.interface().id(), "Office").await;
        assert!(ap.is_connected().await);
        backend.set_connected(ap.interface().id(), "Guest").await;
        assert!(!ap.is_connected().await);
    }

    #[tokio::test]
    async fn entry_without_profile_name_is_never_connected() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        backend.set_connected(ap.interface().id(), "Office").await;

        assert!(!ap.is_connected().await);
    }

    #[tokio::test]
    async fn connection_query_failure_reads_as_disconnected() {
        let backend = SimulatedBackend::new();
        let mut described = network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk);
        described.profile_name = Some("Office".into());
        let ap = access_point(&backend, described).await;
        backend.set_connected(ap.interface().id(), "Office").await;
        backend.set_current_connection_failure(true).await;

        assert!(!ap.is_connected().await);
    }

    #[tokio::test]
    async fn open_network_connects_without_creating_a_profile() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::None, AuthAlgorithm::Open))
            .await;
        let request = AuthRequest::new(&ap);
        backend.clear_calls().await;

        assert!(ap.connect(&request, false).await.unwrap());

        let calls = backend.calls().await;
        assert_eq!(
            calls,
            vec![BackendCall::Connect {
                interface: ap.interface().id(),
                profile: "Office".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn invalid_password_fails_fast_without_backend_calls() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        let mut request = AuthRequest::new(&ap);
        request.set_password("short");
        backend.clear_calls().await;

        assert!(!ap.connect(&request, false).await.unwrap());
        assert_eq!(backend.calls().await, vec![]);
    }

    #[tokio::test]
    async fn secured_connect_creates_profile_then_connects() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        let mut request = AuthRequest::new(&ap);
        request.set_password("hunter2hunter2");
        backend.clear_calls().await;

        assert!(ap.connect(&request, false).await.unwrap());

        let calls = backend.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], BackendCall::SetProfile { .. }));
        assert!(matches!(calls[1], BackendCall::Connect { .. }));
        assert!(ap.profile_xml().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn overwrite_deletes_the_existing_profile_first() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        backend
            .insert_profile(ap.interface().id(), "Office", "<stale/>")
            .await;
        let mut request = AuthRequest::new(&ap);
        request.set_password("hunter2hunter2");
        backend.clear_calls().await;

        assert!(ap.connect(&request, true).await.unwrap());

        let calls = backend.calls().await;
        assert!(matches!(calls[0], BackendCall::DeleteProfile { .. }));
        let xml = ap.profile_xml().await.unwrap().unwrap();
        assert!(xml.contains("hunter2hunter2"));
    }

    #[tokio::test]
    async fn existing_profile_is_reused_when_not_overwriting() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;
        backend
            .insert_profile(ap.interface().id(), "Office", "<existing/>")
            .await;
        // invalid password is fine here, the stored profile already applies
        let mut request = AuthRequest::new(&ap);
        request.set_password("nope");
        backend.clear_calls().await;

        assert!(ap.connect(&request, false).await.unwrap());
        assert_eq!(backend.calls().await.len(), 1);
        assert_eq!(ap.profile_xml().await.unwrap().unwrap(), "<existing/>");
    }

    #[tokio::test]
    async fn timeout_is_reported_as_false() {
        let backend = SimulatedBackend::new();
        backend.set_complete_connects(false).await;
        let ap = access_point(&backend, network(CipherAlgorithm::None, AuthAlgorithm::Open))
            .await;
        let request = AuthRequest::new(&ap);

        let connected = ap
            .connect_with(&request, false, Duration::from_millis(50))
            .await
            .unwrap();
        assert!(!connected);
    }

    #[tokio::test]
    async fn background_connect_reports_through_callback() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::None, AuthAlgorithm::Open))
            .await;
        let request = AuthRequest::new(&ap);

        let (tx, rx) = tokio::sync::oneshot::channel();
        ap.connect_background(request, false, move |success| {
            let _ = tx.send(success);
        });

        assert!(rx.await.unwrap());
    }

    #[tokio::test]
    async fn background_connect_folds_backend_errors_into_false() {
        let backend = SimulatedBackend::new();
        backend.set_connect_failure(true).await;
        let ap = access_point(&backend, network(CipherAlgorithm::None, AuthAlgorithm::Open))
            .await;
        let request = AuthRequest::new(&ap);

        let (tx, rx) = tokio::sync::oneshot::channel();
        ap.connect_background(request, false, move |success| {
            let _ = tx.send(success);
        });

        assert!(!rx.await.unwrap());
    }

    #[tokio::test]
    async fn delete_profile_swallows_missing_profile() {
        let backend = SimulatedBackend::new();
        let ap = access_point(&backend, network(CipherAlgorithm::Ccmp, AuthAlgorithm::RsnaPsk))
            .await;

        // no profile stored; must not panic or error
        ap.delete_profile().await;
    }
}
