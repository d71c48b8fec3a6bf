use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    network::{NetworkError, NetworkProvider},
    wallet::{BasicTransactionData, UnspentOutput},
};

/// State of a single address as seen by one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct BitcoinAddressInfo {
    pub balance: Decimal,
    pub unspent_outputs: Vec<UnspentOutput>,
    pub recent_transactions: Vec<BasicTransactionData>,
    /// `None` when the endpoint cannot tell.
    pub has_unconfirmed: Option<bool>,
}

/// Network fee rates in coin per kilobyte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitcoinFee {
    pub minimal_per_kb: Decimal,
    pub normal_per_kb: Decimal,
    pub priority_per_kb: Decimal,
}

#[async_trait]
pub trait BitcoinNetworkProvider: NetworkProvider {
    async fn get_info(&self, address: &str) -> Result<BitcoinAddressInfo, NetworkError>;

    async fn get_fee(&self) -> Result<BitcoinFee, NetworkError>;

    /// Submits a serialized transaction and returns its txid.
    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError>;

    /// Number of outputs ever spent from `address`, i.e. signatures made by its key.
    async fn get_signature_count(&self, address: &str) -> Result<u64, NetworkError>;
}
