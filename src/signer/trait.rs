use async_trait::async_trait;

use super::error::*;
use crate::primitives::PublicKey;

/// Produces signatures for prepared hashes. How the key is held is up to the implementor.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, hash: &[u8], public_key: &PublicKey) -> Result<Vec<u8>, SignerError>;

    async fn sign_batch(
        &self,
        hashes: &[Vec<u8>],
        public_key: &PublicKey,
    ) -> Result<Vec<Vec<u8>>, SignerError> {
        let mut signatures = Vec::with_capacity(hashes.len());
        for hash in hashes {
            signatures.push(self.sign(hash, public_key).await?);
        }
        Ok(signatures)
    }
}
