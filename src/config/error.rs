use thiserror::Error;

use crate::primitives::{Blockchain, WalletId};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ConfigError - NoProviders: at least one provider is required")]
    NoProviders,
    #[error("ConfigError - MissingCredential: {blockchain} requires {credential}")]
    MissingCredential {
        blockchain: Blockchain,
        credential: &'static str,
    },
    #[error("ConfigError - UnsupportedProvider: {provider} cannot serve {blockchain}")]
    UnsupportedProvider {
        blockchain: Blockchain,
        provider: String,
    },
    #[error("ConfigError - InvalidUrl: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("ConfigError - InvalidHeader: {0}")]
    InvalidHeader(String),
    #[error("ConfigError - HttpClient: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("ConfigError - BlockchainMismatch: wallet {wallet} is on {wallet_chain}, chain serves {chain}")]
    BlockchainMismatch {
        wallet: WalletId,
        wallet_chain: Blockchain,
        chain: Blockchain,
    },
    #[error("ConfigError - NotConfigured: no entry for {0}")]
    NotConfigured(Blockchain),
}
