use async_trait::async_trait;

use crate::{
    network::{NetworkError, NetworkProvider},
    primitives::Token,
};

/// A contract call or value transfer to be priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateRequest {
    pub from: String,
    pub to: String,
    pub value: u128,
    pub data: Option<String>,
}

#[async_trait]
pub trait EthereumNetworkProvider: NetworkProvider {
    async fn get_balance(&self, address: &str) -> Result<u128, NetworkError>;

    async fn get_token_balance(&self, address: &str, token: &Token) -> Result<u128, NetworkError>;

    /// Confirmed transaction count, which is also the next nonce.
    async fn get_tx_count(&self, address: &str) -> Result<u64, NetworkError>;

    async fn get_pending_tx_count(&self, address: &str) -> Result<u64, NetworkError>;

    /// Gas price in wei.
    async fn get_gas_price(&self) -> Result<u128, NetworkError>;

    async fn get_gas_limit(&self, request: &GasEstimateRequest) -> Result<u64, NetworkError>;

    /// Submits a signed transaction and returns its hash.
    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError>;
}

/// Discovers ERC-20 holdings of an address, usually backed by an indexing service.
#[async_trait]
pub trait EthereumTokenIndexer: Send + Sync {
    async fn find_erc20_tokens(&self, address: &str) -> Result<Vec<(Token, u128)>, NetworkError>;
}
