//! Domain types shared between the manager core and the WLAN backend boundary

use uuid::Uuid;

/// Stable identity of a wireless interface (the native GUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(Uuid);

impl InterfaceId {
    /// Create a fresh random identity (used by simulated backends).
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for InterfaceId {
    fn from(guid: Uuid) -> Self {
        Self(guid)
    }
}

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive record for one wireless interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub id: InterfaceId,
    /// Vendor and model string reported by the OS.
    pub description: String,
}

/// Raw SSID bytes as broadcast by the network.
///
/// SSIDs are byte sequences, not guaranteed to be valid UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Human-readable name; undecodable bytes are replaced.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Lowercase hex rendering used inside profile documents.
    ///
    /// A zero byte terminates the rendering: some drivers report SSIDs as
    /// null-terminated fixed buffers, and stored profiles encode only the
    /// bytes before the terminator.
    pub fn to_hex(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        hex::encode(&self.0[..end])
    }
}

impl From<&str> for Ssid {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

/// Default authentication algorithm advertised by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthAlgorithm {
    Open,
    SharedKey,
    Wpa,
    WpaPsk,
    WpaNone,
    Rsna,
    RsnaPsk,
    Vendor(u32),
}

impl AuthAlgorithm {
    /// Enterprise-capable schemes require a username and support a domain.
    pub fn is_enterprise(self) -> bool {
        matches!(self, AuthAlgorithm::Rsna | AuthAlgorithm::Wpa)
    }
}

/// Default cipher algorithm advertised by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    None,
    Wep40,
    Tkip,
    Ccmp,
    Wep104,
    /// WEP with unspecified key length.
    Wep,
    Vendor(u32),
}

/// Basic service set type of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BssType {
    Infrastructure,
    Independent,
    Any,
}

/// One available-network entry as reported by the OS wireless service.
///
/// Multiple entries may share an SSID when their BSS differs; some of them
/// carry the name of a stored profile and some do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub ssid: Ssid,
    pub bss_type: BssType,
    pub security_enabled: bool,
    pub auth: AuthAlgorithm,
    pub cipher: CipherAlgorithm,
    /// Signal quality percentage, 0-100.
    pub signal_quality: u8,
    pub connectable: bool,
    /// Native reason code when `connectable` is false.
    pub not_connectable_reason: Option<u32>,
    /// Name of the stored profile that applies to this entry, if any.
    pub profile_name: Option<String>,
}

impl NetworkDescriptor {
    /// Equality signature used when collapsing duplicate listings.
    pub fn signature(&self) -> NetworkSignature {
        NetworkSignature {
            ssid: self.ssid.clone(),
            bss_type: self.bss_type,
            security_enabled: self.security_enabled,
        }
    }
}

/// Identity of a network listing for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkSignature {
    pub ssid: Ssid,
    pub bss_type: BssType,
    pub security_enabled: bool,
}

/// The connection an interface currently holds, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentConnection {
    pub profile_name: String,
    pub ssid: Ssid,
}

/// Scope under which a profile is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileScope {
    AllUser,
    CurrentUser,
}

/// How a connect request identifies its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// By the name of a stored profile.
    Profile,
    /// By an inline, non-persisted profile document.
    TemporaryProfile,
    /// By SSID, letting the OS pick security settings.
    DiscoverySecure,
    DiscoveryUnsecure,
}

/// Originating layer of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSource {
    /// Auto-configuration (connection manager) layer.
    Acm,
    /// Media-specific (802.11) layer.
    Msm,
    Other(u32),
}

/// Notification code within its source layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCode {
    ConnectionStart,
    ConnectionComplete,
    Disconnected,
    ScanComplete,
    Other(u32),
}

/// One decoded event from the OS notification stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlanNotification {
    pub interface: InterfaceId,
    pub source: NotificationSource,
    pub code: NotificationCode,
    /// Profile name carried by connection notifications.
    pub profile_name: Option<String>,
}

impl WlanNotification {
    pub fn connection_complete(interface: InterfaceId, profile: impl Into<String>) -> Self {
        Self {
            interface,
            source: NotificationSource::Acm,
            code: NotificationCode::ConnectionComplete,
            profile_name: Some(profile.into()),
        }
    }

    pub fn disconnected(interface: InterfaceId, profile: impl Into<String>) -> Self {
        Self {
            interface,
            source: NotificationSource::Acm,
            code: NotificationCode::Disconnected,
            profile_name: Some(profile.into()),
        }
    }
}

/// Coarse connection status across all interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Disconnected,
    Connected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ssid_name_decodes_utf8() {
        let ssid = Ssid::from("HomeNet");
        assert_eq!(ssid.name(), "HomeNet");
    }

    #[test]
    fn ssid_name_replaces_invalid_bytes() {
        let ssid = Ssid::new(vec![b'a', 0xff, b'b']);
        assert_eq!(ssid.name(), "a\u{fffd}b");
    }

    #[test]
    fn ssid_hex_is_lowercase() {
        let ssid = Ssid::new(vec![0xab, 0xcd, 0x12]);
        assert_eq!(ssid.to_hex(), "abcd12");
    }

    #[test]
    fn ssid_hex_stops_at_zero_byte() {
        let ssid = Ssid::new(vec![b'a', b'b', 0, b'c']);
        assert_eq!(ssid.to_hex(), "6162");
    }

    #[test]
    fn signature_ignores_profile_name_and_signal() {
        let network = NetworkDescriptor {
            ssid: Ssid::from("Office"),
            bss_type: BssType::Infrastructure,
            security_enabled: true,
            auth: AuthAlgorithm::RsnaPsk,
            cipher: CipherAlgorithm::Ccmp,
            signal_quality: 80,
            connectable: true,
            not_connectable_reason: None,
            profile_name: Some("Office".into()),
        };
        let mut other = network.clone();
        other.profile_name = None;
        other.signal_quality = 20;

        assert_eq!(network.signature(), other.signature());
    }

    #[test]
    fn enterprise_auth_detection() {
        assert!(AuthAlgorithm::Rsna.is_enterprise());
        assert!(AuthAlgorithm::Wpa.is_enterprise());
        assert!(!AuthAlgorithm::RsnaPsk.is_enterprise());
        assert!(!AuthAlgorithm::WpaPsk.is_enterprise());
        assert!(!AuthAlgorithm::Open.is_enterprise());
    }
}
