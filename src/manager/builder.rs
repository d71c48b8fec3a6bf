use thiserror::Error;

use crate::wallet::{TransactionData, Wallet};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("BuildError - MissingFee")]
    MissingFee,
    #[error("BuildError - NoSpendableOutputs")]
    NoSpendableOutputs,
    #[error("BuildError - NothingToSign")]
    NothingToSign,
    #[error("BuildError - InvalidTransaction: {0}")]
    InvalidTransaction(String),
    #[error("BuildError - Unsupported: {0}")]
    Unsupported(String),
}

/// Bytes ready to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
}

impl SignedTransaction {
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }
}

/// Chain-specific transaction codec.
///
/// `build_for_sign` returns one hash per required signature, in the order the signatures
/// must be handed back to `build_for_send`.
pub trait TransactionBuilder: Send + Sync {
    fn build_for_sign(
        &self,
        transaction: &TransactionData,
        wallet: &Wallet,
    ) -> Result<Vec<Vec<u8>>, BuildError>;

    fn build_for_send(
        &self,
        transaction: &TransactionData,
        wallet: &Wallet,
        signatures: &[Vec<u8>],
    ) -> Result<SignedTransaction, BuildError>;

    /// Serialized size in bytes, used to price per-byte fees.
    fn estimate_size(
        &self,
        _transaction: &TransactionData,
        _wallet: &Wallet,
    ) -> Result<u64, BuildError> {
        Err(BuildError::Unsupported("size estimation".to_string()))
    }
}
