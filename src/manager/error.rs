use thiserror::Error;

use super::{builder::BuildError, chain::Capability};
use crate::{error::DomainError, network::NetworkError, signer::SignerError};

#[derive(Error, Debug)]
pub enum WalletManagerError {
    #[error("WalletManagerError - Network: {0}")]
    Network(#[from] NetworkError),
    #[error("WalletManagerError - Domain: {0}")]
    Domain(#[from] DomainError),
    #[error("WalletManagerError - Signing: {0}")]
    Signing(#[from] SignerError),
    #[error("WalletManagerError - Build: {0}")]
    Build(#[from] BuildError),
    #[error("WalletManagerError - CapabilityNotSupported: {0:?}")]
    CapabilityNotSupported(Capability),
    #[error("WalletManagerError - Cancelled")]
    Cancelled,
}

impl WalletManagerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Network(e) => e.domain(),
            _ => None,
        }
    }
}
