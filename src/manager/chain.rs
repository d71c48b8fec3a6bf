use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    builder::{SignedTransaction, TransactionBuilder},
    error::WalletManagerError,
};
use crate::{
    network::NetworkError,
    primitives::{Amount, Blockchain},
    wallet::{TransactionFee, Wallet},
};

/// Optional operations a chain may offer beyond sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TransactionSender,
    SignatureCountValidator,
    TokenFinder,
}

#[async_trait]
pub trait SignatureCountValidator: Send + Sync {
    /// How many signatures the wallet's key has produced on chain.
    async fn signature_count(&self, wallet: &Wallet) -> Result<u64, NetworkError>;
}

#[async_trait]
pub trait TokenFinder: Send + Sync {
    /// Token balances held by the wallet that it may not be tracking yet.
    async fn find_tokens(&self, wallet: &Wallet) -> Result<Vec<Amount>, NetworkError>;
}

/// Everything that differs between chains, injected into a `WalletManager`.
///
/// Refreshing is split in two: `fetch_update` talks to the network against a snapshot and
/// may fail freely, `commit` applies the result and cannot fail. The manager only ever
/// calls `commit` with the result of a successful fetch.
#[async_trait]
pub trait WalletChain: Send + Sync + 'static {
    type Update: Send + 'static;

    fn blockchain(&self) -> Blockchain;

    fn current_host(&self) -> String;

    fn dust_value(&self) -> Option<Decimal> {
        None
    }

    async fn fetch_update(&self, wallet: &Wallet) -> Result<Self::Update, NetworkError>;

    fn commit(&self, wallet: &mut Wallet, update: Self::Update);

    async fn fee(
        &self,
        wallet: &Wallet,
        amount: &Amount,
        destination: &str,
    ) -> Result<TransactionFee, WalletManagerError>;

    /// Returns the transaction hash reported by the network.
    async fn broadcast(&self, transaction: &SignedTransaction) -> Result<String, NetworkError>;

    fn transaction_builder(&self) -> &dyn TransactionBuilder;

    fn signature_count_validator(&self) -> Option<&dyn SignatureCountValidator> {
        None
    }

    fn token_finder(&self) -> Option<&dyn TokenFinder> {
        None
    }
}
