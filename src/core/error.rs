//! Error types for WLAN operations

use std::time::Duration;

use thiserror::Error;

use crate::core::types::{CipherAlgorithm, InterfaceId};
use crate::profile::ProfileError;

/// Result type for backend boundary operations
pub type WlanResult<T> = Result<T, WlanError>;

/// Result type for connect orchestration
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Failures reported by the OS wireless service.
#[derive(Error, Debug, Clone)]
pub enum WlanError {
    /// A native call returned a non-success code.
    #[error("wlan {operation} failed: {reason}")]
    OperationFailed {
        operation: &'static str,
        reason: String,
    },

    #[error("unknown interface {0}")]
    UnknownInterface(InterfaceId),

    #[error("no stored profile named {0:?}")]
    ProfileNotFound(String),
}

impl WlanError {
    pub fn operation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation,
            reason: reason.into(),
        }
    }
}

/// Failures of a single connect or profile-commit attempt.
///
/// Fatal to the attempt, never to the process. A timeout is reported here by
/// the reconciler and mapped to a plain `false` outcome at the access-point
/// surface.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("password does not satisfy the rules for cipher {0:?}")]
    InvalidCredential(CipherAlgorithm),

    #[error("no matching connection notification within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Backend(#[from] WlanError),
}
