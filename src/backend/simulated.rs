//! In-memory WLAN backend for tests and the demo console

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use crate::backend::WlanBackend;
use crate::core::error::{WlanError, WlanResult};
use crate::core::types::{
    BssType, ConnectionMode, CurrentConnection, InterfaceId, InterfaceInfo, NetworkDescriptor,
    ProfileScope, Ssid, WlanNotification,
};

/// Mutating backend calls, recorded in order for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SetProfile {
        interface: InterfaceId,
        name: String,
        overwrite: bool,
    },
    DeleteProfile {
        interface: InterfaceId,
        name: String,
    },
    SetEapCredentials {
        interface: InterfaceId,
        profile: String,
    },
    Connect {
        interface: InterfaceId,
        profile: String,
    },
    Disconnect {
        interface: InterfaceId,
    },
    Scan {
        interface: InterfaceId,
    },
}

#[derive(Debug, Default)]
struct SimState {
    interfaces: Vec<InterfaceInfo>,
    networks: HashMap<InterfaceId, Vec<NetworkDescriptor>>,
    // name -> document, per interface
    profiles: HashMap<InterfaceId, Vec<(String, String)>>,
    eap_credentials: HashMap<InterfaceId, HashMap<String, String>>,
    connections: HashMap<InterfaceId, CurrentConnection>,
    calls: Vec<BackendCall>,
    fail_profile_queries: bool,
    fail_current_connection: bool,
    fail_set_profile: bool,
    fail_set_eap: bool,
    fail_connect: bool,
    fail_disconnect: bool,
    // when true, a successful connect immediately emits ConnectionComplete
    complete_connects: bool,
}

/// Simulated OS wireless service.
///
/// Scriptable state plus a recorded call log; successful connects emit a
/// `ConnectionComplete` notification unless completion is switched off,
/// which lets tests exercise the timeout path.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    inner: Arc<Mutex<SimState>>,
    events: broadcast::Sender<WlanNotification>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(SimState {
                complete_connects: true,
                ..SimState::default()
            })),
            events,
        }
    }

    /// Add an interface and return its identity.
    pub async fn add_interface(&self, description: &str) -> InterfaceId {
        let id = InterfaceId::generate();
        self.inner.lock().await.interfaces.push(InterfaceInfo {
            id,
            description: description.to_string(),
        });
        id
    }

    /// Make a network visible on an interface.
    pub async fn add_network(&self, interface: InterfaceId, network: NetworkDescriptor) {
        self.inner
            .lock()
            .await
            .networks
            .entry(interface)
            .or_default()
            .push(network);
    }

    /// Seed a stored profile directly.
    pub async fn insert_profile(&self, interface: InterfaceId, name: &str, xml: &str) {
        self.inner
            .lock()
            .await
            .profiles
            .entry(interface)
            .or_default()
            .push((name.to_string(), xml.to_string()));
    }

    /// Mark an interface as currently connected to a profile.
    pub async fn set_connected(&self, interface: InterfaceId, profile: &str) {
        self.inner.lock().await.connections.insert(
            interface,
            CurrentConnection {
                profile_name: profile.to_string(),
                ssid: Ssid::from(profile),
            },
        );
    }

    /// Stored EAP user document for a profile, if any.
    pub async fn eap_user_data(&self, interface: InterfaceId, profile: &str) -> Option<String> {
        self.inner
            .lock()
            .await
            .eap_credentials
            .get(&interface)?
            .get(profile)
            .cloned()
    }

    /// Recorded mutating calls, oldest first.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    /// Toggle automatic `ConnectionComplete` emission after connect.
    pub async fn set_complete_connects(&self, complete: bool) {
        self.inner.lock().await.complete_connects = complete;
    }

    pub async fn set_profile_query_failure(&self, fail: bool) {
        self.inner.lock().await.fail_profile_queries = fail;
    }

    pub async fn set_current_connection_failure(&self, fail: bool) {
        self.inner.lock().await.fail_current_connection = fail;
    }

    pub async fn set_set_profile_failure(&self, fail: bool) {
        self.inner.lock().await.fail_set_profile = fail;
    }

    pub async fn set_eap_failure(&self, fail: bool) {
        self.inner.lock().await.fail_set_eap = fail;
    }

    pub async fn set_connect_failure(&self, fail: bool) {
        self.inner.lock().await.fail_connect = fail;
    }

    pub async fn set_disconnect_failure(&self, fail: bool) {
        self.inner.lock().await.fail_disconnect = fail;
    }

    /// Inject a notification as if the OS delivered it.
    pub fn emit(&self, notification: WlanNotification) {
        let _ = self.events.send(notification);
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// The OS derives the stored name from the document's <name> element.
fn profile_name_from_xml(xml: &str) -> Option<String> {
    let start = xml.find("<name>")? + "<name>".len();
    let end = xml[start..].find("</name>")? + start;
    Some(xml[start..end].to_string())
}

impl SimState {
    fn known(&self, interface: InterfaceId) -> WlanResult<()> {
        if self.interfaces.iter().any(|i| i.id == interface) {
            Ok(())
        } else {
            Err(WlanError::UnknownInterface(interface))
        }
    }
}

impl WlanBackend for SimulatedBackend {
    async fn interfaces(&self) -> WlanResult<Vec<InterfaceInfo>> {
        Ok(self.inner.lock().await.interfaces.clone())
    }

    async fn networks(&self, interface: InterfaceId) -> WlanResult<Vec<NetworkDescriptor>> {
        let state = self.inner.lock().await;
        state.known(interface)?;
        Ok(state.networks.get(&interface).cloned().unwrap_or_default())
    }

    async fn current_connection(
        &self,
        interface: InterfaceId,
    ) -> WlanResult<Option<CurrentConnection>> {
        let state = self.inner.lock().await;
        state.known(interface)?;
        if state.fail_current_connection {
            return Err(WlanError::operation(
                "query current connection",
                "interface is resetting",
            ));
        }
        Ok(state.connections.get(&interface).cloned())
    }

    async fn profile_names(&self, interface: InterfaceId) -> WlanResult<Vec<String>> {
        let state = self.inner.lock().await;
        state.known(interface)?;
        if state.fail_profile_queries {
            return Err(WlanError::operation(
                "get profile list",
                "interface is resetting",
            ));
        }
        Ok(state
            .profiles
            .get(&interface)
            .map(|profiles| profiles.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    async fn profile_xml(&self, interface: InterfaceId, name: &str) -> WlanResult<Option<String>> {
        let state = self.inner.lock().await;
        state.known(interface)?;
        if state.fail_profile_queries {
            return Err(WlanError::operation(
                "get profile",
                "interface is resetting",
            ));
        }
        Ok(state.profiles.get(&interface).and_then(|profiles| {
            profiles
                .iter()
                .find(|(stored, _)| stored == name)
                .map(|(_, xml)| xml.clone())
        }))
    }

    async fn set_profile(
        &self,
        interface: InterfaceId,
        _scope: ProfileScope,
        xml: &str,
        overwrite: bool,
    ) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;

        let name = profile_name_from_xml(xml)
            .ok_or_else(|| WlanError::operation("set profile", "document carries no name"))?;
        state.calls.push(BackendCall::SetProfile {
            interface,
            name: name.clone(),
            overwrite,
        });

        if state.fail_set_profile {
            return Err(WlanError::operation("set profile", "access denied"));
        }

        let profiles = state.profiles.entry(interface).or_default();
        if let Some(existing) = profiles.iter_mut().find(|(stored, _)| *stored == name) {
            if !overwrite {
                return Err(WlanError::operation("set profile", "profile exists"));
            }
            existing.1 = xml.to_string();
        } else {
            profiles.push((name, xml.to_string()));
        }
        Ok(())
    }

    async fn delete_profile(&self, interface: InterfaceId, name: &str) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;
        state.calls.push(BackendCall::DeleteProfile {
            interface,
            name: name.to_string(),
        });

        let profiles = state.profiles.entry(interface).or_default();
        let before = profiles.len();
        profiles.retain(|(stored, _)| stored != name);
        if profiles.len() == before {
            return Err(WlanError::ProfileNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn set_eap_credentials(
        &self,
        interface: InterfaceId,
        profile: &str,
        user_xml: &str,
    ) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;
        state.calls.push(BackendCall::SetEapCredentials {
            interface,
            profile: profile.to_string(),
        });

        if state.fail_set_eap {
            return Err(WlanError::operation("set eap user data", "access denied"));
        }
        state
            .eap_credentials
            .entry(interface)
            .or_default()
            .insert(profile.to_string(), user_xml.to_string());
        Ok(())
    }

    async fn connect(
        &self,
        interface: InterfaceId,
        _mode: ConnectionMode,
        _bss: BssType,
        profile: &str,
    ) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;
        state.calls.push(BackendCall::Connect {
            interface,
            profile: profile.to_string(),
        });

        if state.fail_connect {
            return Err(WlanError::operation("connect", "radio is off"));
        }
        if state.complete_connects {
            state.connections.insert(
                interface,
                CurrentConnection {
                    profile_name: profile.to_string(),
                    ssid: Ssid::from(profile),
                },
            );
            let _ = self
                .events
                .send(WlanNotification::connection_complete(interface, profile));
        }
        Ok(())
    }

    async fn disconnect(&self, interface: InterfaceId) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;
        state.calls.push(BackendCall::Disconnect { interface });

        if state.fail_disconnect {
            return Err(WlanError::operation("disconnect", "radio is off"));
        }
        if let Some(connection) = state.connections.remove(&interface) {
            let _ = self.events.send(WlanNotification::disconnected(
                interface,
                connection.profile_name,
            ));
        }
        Ok(())
    }

    async fn scan(&self, interface: InterfaceId) -> WlanResult<()> {
        let mut state = self.inner.lock().await;
        state.known(interface)?;
        state.calls.push(BackendCall::Scan { interface });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WlanNotification> {
        self.events.subscribe()
    }
}
