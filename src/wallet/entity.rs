use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use super::transaction::*;
use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[default]
    Default,
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub value: String,
    #[serde(default)]
    pub kind: AddressKind,
}

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: AddressKind::Default,
        }
    }

    pub fn legacy(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: AddressKind::Legacy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub transaction_hash: String,
    pub output_index: u32,
    pub amount: Decimal,
    pub address: String,
    #[serde(default)]
    pub output_script: Option<String>,
    #[serde(default)]
    pub derivation_path: Option<String>,
}

/// Balance, history and identity of one public key on one chain.
///
/// Owned by exactly one `WalletManager`; everything handed out of the manager is a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub id: WalletId,
    pub blockchain: Blockchain,
    pub public_key: PublicKey,
    addresses: Vec<Address>,
    amounts: HashMap<AmountType, Amount>,
    tokens: Vec<Token>,
    pub recent_transactions: Vec<TransactionData>,
    pub outputs_count: Option<usize>,
    pub unspent_outputs: Vec<UnspentOutput>,
    pub nonce: Option<u64>,
}

impl Wallet {
    /// `addresses` must not be empty; the first `Default` address is the primary one.
    pub fn new(blockchain: Blockchain, public_key: PublicKey, addresses: Vec<Address>) -> Self {
        let mut amounts = HashMap::new();
        amounts.insert(AmountType::Coin, Amount::zero_coin(blockchain));
        Self {
            id: WalletId::new(),
            blockchain,
            public_key,
            addresses,
            amounts,
            tokens: Vec::new(),
            recent_transactions: Vec::new(),
            outputs_count: None,
            unspent_outputs: Vec::new(),
            nonce: None,
        }
    }

    pub fn address(&self) -> &str {
        self.addresses
            .iter()
            .find(|a| a.kind == AddressKind::Default)
            .or_else(|| self.addresses.first())
            .map(|a| a.value.as_str())
            .unwrap_or(UNKNOWN_ADDRESS)
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn amounts(&self) -> &HashMap<AmountType, Amount> {
        &self.amounts
    }

    pub fn amount(&self, amount_type: &AmountType) -> Option<&Amount> {
        self.amounts
            .iter()
            .find(|(t, _)| t.is_same_asset(amount_type))
            .map(|(_, amount)| amount)
    }

    pub fn coin_amount(&self) -> Amount {
        self.amounts
            .get(&AmountType::Coin)
            .cloned()
            .unwrap_or_else(|| Amount::zero_coin(self.blockchain))
    }

    pub fn funds_available(&self, amount_type: &AmountType) -> Decimal {
        self.amount(amount_type)
            .map(|amount| amount.value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn unspent_balance(&self) -> Decimal {
        self.unspent_outputs.iter().map(|utxo| utxo.amount).sum()
    }

    pub fn set_coin_value(&mut self, value: Decimal) {
        let coin = self.coin_amount().with_value(value);
        self.amounts.insert(AmountType::Coin, coin);
    }

    pub fn set_token_value(&mut self, token: &Token, value: Decimal) {
        self.add_token(token.clone());
        let amount_type = AmountType::Token(token.clone());
        self.amounts
            .retain(|t, _| !t.is_same_asset(&amount_type));
        self.amounts.insert(amount_type, Amount::token(token, value));
    }

    pub fn add_token(&mut self, token: Token) {
        if !self
            .tokens
            .iter()
            .any(|t| t.contract_address.eq_ignore_ascii_case(&token.contract_address))
        {
            self.tokens.push(token);
        }
    }

    pub fn remove_token(&mut self, token: &Token) {
        self.tokens
            .retain(|t| !t.contract_address.eq_ignore_ascii_case(&token.contract_address));
        let amount_type = AmountType::Token(token.clone());
        self.amounts.retain(|t, _| !t.is_same_asset(&amount_type));
    }

    pub fn unconfirmed_hashes(&self) -> Vec<String> {
        self.recent_transactions
            .iter()
            .filter(|tx| !tx.is_confirmed())
            .filter_map(|tx| tx.hash.clone())
            .collect()
    }

    pub fn add_outgoing_transaction(&mut self, mut transaction: TransactionData) {
        transaction.status = TransactionStatus::Unconfirmed;
        transaction.hash = transaction.hash.map(|hash| hash.to_lowercase());
        let known = match transaction.hash.as_deref() {
            Some(hash) => self.recent_transactions.iter().any(|tx| tx.has_hash(hash)),
            None => false,
        };
        if !known {
            self.recent_transactions.push(transaction);
        }
    }

    /// Marks that something is pending on chain without knowing what it is.
    pub fn add_transaction_dummy(&mut self) {
        if self.recent_transactions.iter().any(|tx| !tx.is_confirmed()) {
            return;
        }
        let coin = self.coin_amount();
        self.recent_transactions.push(TransactionData {
            amount: coin.with_value(Decimal::ZERO),
            fee: None,
            source_address: UNKNOWN_ADDRESS.to_string(),
            destination_address: UNKNOWN_ADDRESS.to_string(),
            contract_address: None,
            status: TransactionStatus::Unconfirmed,
            hash: None,
            date: Utc::now(),
        });
    }

    pub fn confirm_all(&mut self) {
        for tx in self.recent_transactions.iter_mut() {
            tx.status = TransactionStatus::Confirmed;
        }
    }

    /// Reconciles local history against entries reported by the network.
    pub fn update_recent_transactions(&mut self, transactions: Vec<TransactionData>) {
        let (confirmed, unconfirmed): (Vec<_>, Vec<_>) =
            transactions.into_iter().partition(|tx| tx.is_confirmed());

        for recent in self.recent_transactions.iter_mut() {
            let Some(hash) = recent.hash.as_deref() else {
                continue;
            };
            if confirmed.iter().any(|tx| tx.has_hash(hash)) {
                recent.status = TransactionStatus::Confirmed;
            }
        }
        for tx in unconfirmed {
            let known = match tx.hash.as_deref() {
                Some(hash) => self.recent_transactions.iter().any(|recent| recent.has_hash(hash)),
                None => false,
            };
            if !known {
                self.recent_transactions.push(tx);
            }
        }
    }

    pub fn update_recent_transactions_basic(&mut self, transactions: Vec<BasicTransactionData>) {
        let coin = self.coin_amount();
        let transactions = transactions
            .iter()
            .map(|tx| tx.to_transaction_data(&coin))
            .collect();
        self.update_recent_transactions(transactions);
    }
}
