//! Credential collection and profile commit for one connect attempt

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::WlanBackend;
use crate::core::access_point::AccessPoint;
use crate::core::error::ConnectResult;
use crate::core::interface::Interface;
use crate::core::types::{CipherAlgorithm, NetworkDescriptor, ProfileScope};
use crate::profile::{builder, eap, password};

/// Credentials for a single connect attempt against one access point.
///
/// Which fields are required is derived from the network's advertised
/// security parameters at construction and never changes afterwards:
/// a password is required when security is enabled and the cipher is not
/// `None`; a username is required (and a domain supported) exactly when the
/// authentication algorithm is enterprise-capable (RSNA or WPA).
pub struct AuthRequest<B> {
    interface: Arc<Interface<B>>,
    network: NetworkDescriptor,
    password_required: bool,
    enterprise: bool,
    password: Option<String>,
    username: Option<String>,
    domain: Option<String>,
}

impl<B: WlanBackend> AuthRequest<B> {
    pub fn new(access_point: &AccessPoint<B>) -> Self {
        let network = access_point.network().clone();
        let password_required =
            network.security_enabled && network.cipher != CipherAlgorithm::None;
        let enterprise = network.auth.is_enterprise();

        Self {
            interface: access_point.interface().clone(),
            network,
            password_required,
            enterprise,
            password: None,
            username: None,
            domain: None,
        }
    }

    pub fn is_password_required(&self) -> bool {
        self.password_required
    }

    pub fn is_username_required(&self) -> bool {
        self.enterprise
    }

    pub fn is_domain_supported(&self) -> bool {
        self.enterprise
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = Some(domain.into());
    }

    /// Whether the supplied password satisfies the network's cipher rules.
    pub fn is_password_valid(&self) -> bool {
        password::is_valid(self.password.as_deref().unwrap_or(""), self.network.cipher)
    }

    /// Name under which credentials and the profile are stored.
    fn profile_name(&self) -> String {
        self.network
            .profile_name
            .clone()
            .unwrap_or_else(|| self.network.ssid.name())
    }

    /// Commit EAP user credentials for an enterprise network.
    ///
    /// Returns false when the backend refuses the credentials.
    async fn save_eap_credentials(&self) -> ConnectResult<bool> {
        let user_xml = eap::generate(
            self.network.cipher,
            self.username.as_deref().unwrap_or(""),
            self.password.as_deref().unwrap_or(""),
            self.domain.as_deref().unwrap_or(""),
        )?;

        match self
            .interface
            .set_eap_credentials(&self.profile_name(), &user_xml)
            .await
        {
            Ok(()) => Ok(true),
            Err(error) => {
                warn!(%error, "storing eap credentials failed");
                Ok(false)
            }
        }
    }

    /// Validate the credentials and push the resulting profile to the OS.
    ///
    /// Returns `Ok(false)` without touching the backend when the password is
    /// invalid, and `Ok(false)` when enterprise credentials are refused (the
    /// main profile is then never pushed). Profile-generation and set-profile
    /// failures surface as errors.
    pub async fn process(&self) -> ConnectResult<bool> {
        if !self.is_password_valid() {
            debug!(cipher = ?self.network.cipher, "password rejected before any backend call");
            return Ok(false);
        }

        if self.enterprise && !self.save_eap_credentials().await? {
            return Ok(false);
        }

        let profile_xml =
            builder::generate(&self.network, self.password.as_deref().unwrap_or(""))?;
        self.interface
            .set_profile(ProfileScope::AllUser, &profile_xml, true)
            .await?;

        Ok(true)
    }
}
