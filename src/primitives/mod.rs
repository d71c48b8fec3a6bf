mod amount;

use serde::{Deserialize, Serialize};

use std::fmt;

pub use amount::*;

crate::entity_id! { WalletId }

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blockchain {
    Bitcoin,
    BitcoinTestnet,
    Litecoin,
    Dogecoin,
    Ethereum,
    EthereumTestnet,
}

impl Blockchain {
    pub fn decimals(&self) -> u32 {
        match self {
            Self::Bitcoin | Self::BitcoinTestnet | Self::Litecoin | Self::Dogecoin => 8,
            Self::Ethereum | Self::EthereumTestnet => 18,
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Self::Bitcoin | Self::BitcoinTestnet => "BTC",
            Self::Litecoin => "LTC",
            Self::Dogecoin => "DOGE",
            Self::Ethereum | Self::EthereumTestnet => "ETH",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::BitcoinTestnet | Self::EthereumTestnet)
    }

    /// Chains whose coin balance is the sum of discrete unspent outputs.
    pub fn is_utxo_model(&self) -> bool {
        matches!(
            self,
            Self::Bitcoin | Self::BitcoinTestnet | Self::Litecoin | Self::Dogecoin
        )
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bitcoin => "bitcoin",
            Self::BitcoinTestnet => "bitcoin_testnet",
            Self::Litecoin => "litecoin",
            Self::Dogecoin => "dogecoin",
            Self::Ethereum => "ethereum",
            Self::EthereumTestnet => "ethereum_testnet",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub contract_address: String,
    pub decimals: u32,
}

impl Token {
    pub fn new(symbol: impl Into<String>, contract_address: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            contract_address: contract_address.into(),
            decimals,
        }
    }

    fn same_contract(&self, other: &Token) -> bool {
        self.contract_address
            .eq_ignore_ascii_case(&other.contract_address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmountType {
    Coin,
    Token(Token),
    Reserve,
}

impl AmountType {
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_same_asset(&self, other: &AmountType) -> bool {
        match (self, other) {
            (Self::Token(a), Self::Token(b)) => a.same_contract(b),
            (a, b) => a == b,
        }
    }
}

/// Public key identity handed to the signer. The derivation path is opaque to this crate.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "hex::serde")]
    pub blockchain_key: Vec<u8>,
    #[serde(default)]
    pub derivation_path: Option<String>,
}

impl PublicKey {
    pub fn new(blockchain_key: Vec<u8>) -> Self {
        Self {
            blockchain_key,
            derivation_path: None,
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.blockchain_key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Unconfirmed,
    Confirmed,
}
