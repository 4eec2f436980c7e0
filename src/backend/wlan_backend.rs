//! WLAN backend trait definition

use tokio::sync::broadcast;
use trait_variant::make;

use crate::core::error::WlanResult;
use crate::core::types::{
    BssType, ConnectionMode, CurrentConnection, InterfaceId, InterfaceInfo, NetworkDescriptor,
    ProfileScope, WlanNotification,
};

/// Abstraction over the OS wireless service.
///
/// Mirrors the native capability set: interface enumeration, network
/// listing, profile storage, EAP credential storage, connect/disconnect/scan
/// and a single global notification stream. Implementations decode native
/// records into owned value types; the core never sees raw buffers.
///
/// `current_connection` and `profile_xml` report absence as `Ok(None)`;
/// "not connected" and "no such profile" are ordinary states, not errors.
#[make(Send)]
pub trait WlanBackend: Sync + 'static {
    /// Enumerate wireless interfaces with stable identities.
    async fn interfaces(&self) -> WlanResult<Vec<InterfaceInfo>>;

    /// List the networks an interface currently sees.
    async fn networks(&self, interface: InterfaceId) -> WlanResult<Vec<NetworkDescriptor>>;

    /// The connection an interface currently holds, if any.
    async fn current_connection(
        &self,
        interface: InterfaceId,
    ) -> WlanResult<Option<CurrentConnection>>;

    /// Names of all profiles stored on an interface.
    async fn profile_names(&self, interface: InterfaceId) -> WlanResult<Vec<String>>;

    /// The stored profile document, if a profile by that name exists.
    async fn profile_xml(&self, interface: InterfaceId, name: &str) -> WlanResult<Option<String>>;

    /// Store a profile document; `overwrite` replaces an existing profile of
    /// the same name instead of failing.
    async fn set_profile(
        &self,
        interface: InterfaceId,
        scope: ProfileScope,
        xml: &str,
        overwrite: bool,
    ) -> WlanResult<()>;

    /// Delete a stored profile by name.
    async fn delete_profile(&self, interface: InterfaceId, name: &str) -> WlanResult<()>;

    /// Store EAP user credentials for a profile.
    async fn set_eap_credentials(
        &self,
        interface: InterfaceId,
        profile: &str,
        user_xml: &str,
    ) -> WlanResult<()>;

    /// Issue a connect request. Returns as soon as the OS accepts the
    /// request; progress is reported through the notification stream.
    async fn connect(
        &self,
        interface: InterfaceId,
        mode: ConnectionMode,
        bss: BssType,
        profile: &str,
    ) -> WlanResult<()>;

    /// Disconnect the interface from its current network.
    async fn disconnect(&self, interface: InterfaceId) -> WlanResult<()>;

    /// Request a scan for available networks.
    async fn scan(&self, interface: InterfaceId) -> WlanResult<()>;

    /// Subscribe to the global notification stream. Events for a given
    /// interface are delivered in the order the OS produced them.
    fn subscribe(&self) -> broadcast::Receiver<WlanNotification>;
}
