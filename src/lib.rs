//! Wi-Fi access manager
//!
//! Discovery, credential profile generation and connection establishment on
//! top of an OS wireless service. The native service sits behind the
//! [`backend::WlanBackend`] trait; everything above it is portable logic:
//! password validation, profile/EAP document generation, access-point
//! aggregation and the reconciliation of asynchronous connection
//! notifications into synchronous connect calls.

pub mod backend;
pub mod config;
pub mod core;
pub mod profile;

pub use crate::core::{
    access_point::{AccessPoint, CONNECT_TIMEOUT},
    auth_request::AuthRequest,
    error::{ConnectError, ConnectResult, WlanError, WlanResult},
    interface::Interface,
    manager::WifiManager,
    types::{
        AuthAlgorithm, BssType, CipherAlgorithm, ConnectionMode, CurrentConnection, InterfaceId,
        InterfaceInfo, NetworkDescriptor, NotificationCode, NotificationSource, ProfileScope,
        Ssid, WifiStatus, WlanNotification,
    },
};
pub use crate::profile::ProfileError;
