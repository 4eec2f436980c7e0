//! Profile document generation and credential validation

pub mod builder;
pub mod eap;
pub mod password;

use thiserror::Error;

use crate::core::types::CipherAlgorithm;

/// Failures while generating a profile or credential document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The cipher/auth combination has no known document template.
    #[error("no profile template for cipher {0:?}")]
    UnsupportedCipher(CipherAlgorithm),
}
