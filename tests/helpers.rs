#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chainwallet::{
    chains::{bitcoin::*, ethereum::*},
    config::ManagerConfig,
    error::DomainError,
    fees::GasFeeConfig,
    manager::*,
    network::{NetworkError, NetworkProvider},
    primitives::*,
    signer::{SignerError, TransactionSigner},
    wallet::*,
};

#[derive(Debug, Clone)]
pub enum Failure {
    Transport,
    Timeout,
    OutOfRange,
    Domain(DomainError),
}

impl Failure {
    fn to_error(&self, host: &str) -> NetworkError {
        match self {
            Failure::Transport => NetworkError::Transport(format!("{host}: connection refused")),
            Failure::Timeout => NetworkError::Timeout(format!("{host}: timed out")),
            Failure::OutOfRange => {
                NetworkError::ValueOutOfRange(format!("{host}: 0x{}", "f".repeat(64)))
            }
            Failure::Domain(e) => NetworkError::Domain(e.clone()),
        }
    }
}

pub struct StubBitcoinProvider {
    url: String,
    infos: Mutex<HashMap<String, BitcoinAddressInfo>>,
    address_failures: Mutex<HashMap<String, Failure>>,
    failure: Mutex<Option<Failure>>,
    delay: Mutex<Option<Duration>>,
    fee: Mutex<BitcoinFee>,
    signature_counts: Mutex<HashMap<String, u64>>,
    broadcasts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubBitcoinProvider {
    pub fn new(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            infos: Mutex::new(HashMap::new()),
            address_failures: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            fee: Mutex::new(BitcoinFee {
                minimal_per_kb: dec!(0.00005),
                normal_per_kb: dec!(0.0002),
                priority_per_kb: dec!(0.0005),
            }),
            signature_counts: Mutex::new(HashMap::new()),
            broadcasts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_info(&self, address: &str, info: BitcoinAddressInfo) {
        self.infos.lock().unwrap().insert(address.to_string(), info);
    }

    pub fn fail_all(&self, failure: Failure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
        self.address_failures.lock().unwrap().clear();
    }

    pub fn fail_address(&self, address: &str, failure: Failure) {
        self.address_failures
            .lock()
            .unwrap()
            .insert(address.to_string(), failure);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_fee(&self, fee: BitcoinFee) {
        *self.fee.lock().unwrap() = fee;
    }

    pub fn set_signature_count(&self, address: &str, count: u64) {
        self.signature_counts
            .lock()
            .unwrap()
            .insert(address.to_string(), count);
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, address: Option<&str>) -> Result<(), NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = self.failure.lock().unwrap().as_ref() {
            return Err(failure.to_error(&self.url));
        }
        if let Some(address) = address {
            if let Some(failure) = self.address_failures.lock().unwrap().get(address) {
                return Err(failure.to_error(&self.url));
            }
        }
        Ok(())
    }
}

impl NetworkProvider for StubBitcoinProvider {
    fn base_url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BitcoinNetworkProvider for StubBitcoinProvider {
    async fn get_info(&self, address: &str) -> Result<BitcoinAddressInfo, NetworkError> {
        self.enter(Some(address)).await?;
        self.infos
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| DomainError::AccountNotFound(address.to_string()).into())
    }

    async fn get_fee(&self) -> Result<BitcoinFee, NetworkError> {
        self.enter(None).await?;
        Ok(*self.fee.lock().unwrap())
    }

    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError> {
        self.enter(None).await?;
        self.broadcasts
            .lock()
            .unwrap()
            .push(transaction_hex.to_string());
        Ok(fake_txid(transaction_hex))
    }

    async fn get_signature_count(&self, address: &str) -> Result<u64, NetworkError> {
        self.enter(Some(address)).await?;
        Ok(self
            .signature_counts
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }
}

/// Upper-case so callers can observe hash normalization.
pub fn fake_txid(transaction_hex: &str) -> String {
    let mut txid: String = transaction_hex.chars().rev().take(64).collect();
    txid.make_ascii_uppercase();
    txid
}

#[derive(Debug, Clone)]
pub struct EthereumState {
    pub balance: u128,
    pub token_balances: HashMap<String, u128>,
    pub tx_count: u64,
    pub pending_tx_count: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

impl Default for EthereumState {
    fn default() -> Self {
        Self {
            balance: 0,
            token_balances: HashMap::new(),
            tx_count: 0,
            pending_tx_count: 0,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
        }
    }
}

pub struct StubEthereumProvider {
    url: String,
    state: Mutex<EthereumState>,
    failure: Mutex<Option<Failure>>,
    gas_requests: Mutex<Vec<GasEstimateRequest>>,
    broadcasts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubEthereumProvider {
    pub fn new(url: &str, state: EthereumState) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            state: Mutex::new(state),
            failure: Mutex::new(None),
            gas_requests: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn update_state(&self, f: impl FnOnce(&mut EthereumState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn fail_all(&self, failure: Failure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn gas_requests(&self) -> Vec<GasEstimateRequest> {
        self.gas_requests.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<EthereumState, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure.lock().unwrap().as_ref() {
            return Err(failure.to_error(&self.url));
        }
        Ok(self.state.lock().unwrap().clone())
    }
}

impl NetworkProvider for StubEthereumProvider {
    fn base_url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EthereumNetworkProvider for StubEthereumProvider {
    async fn get_balance(&self, _address: &str) -> Result<u128, NetworkError> {
        Ok(self.enter()?.balance)
    }

    async fn get_token_balance(&self, _address: &str, token: &Token) -> Result<u128, NetworkError> {
        let state = self.enter()?;
        Ok(state
            .token_balances
            .get(&token.contract_address.to_lowercase())
            .copied()
            .unwrap_or(0))
    }

    async fn get_tx_count(&self, _address: &str) -> Result<u64, NetworkError> {
        Ok(self.enter()?.tx_count)
    }

    async fn get_pending_tx_count(&self, _address: &str) -> Result<u64, NetworkError> {
        Ok(self.enter()?.pending_tx_count)
    }

    async fn get_gas_price(&self) -> Result<u128, NetworkError> {
        Ok(self.enter()?.gas_price)
    }

    async fn get_gas_limit(&self, request: &GasEstimateRequest) -> Result<u64, NetworkError> {
        let state = self.enter()?;
        self.gas_requests.lock().unwrap().push(request.clone());
        Ok(state.gas_limit)
    }

    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError> {
        self.enter()?;
        self.broadcasts
            .lock()
            .unwrap()
            .push(transaction_hex.to_string());
        Ok(format!("0x{}", fake_txid(transaction_hex)))
    }
}

pub struct StubTokenIndexer {
    pub tokens: Vec<(Token, u128)>,
}

#[async_trait]
impl EthereumTokenIndexer for StubTokenIndexer {
    async fn find_erc20_tokens(&self, _address: &str) -> Result<Vec<(Token, u128)>, NetworkError> {
        Ok(self.tokens.clone())
    }
}

/// Encodes the transaction fields without any randomness.
pub struct StubBuilder {
    pub size: u64,
    pub signatures_required: usize,
}

impl StubBuilder {
    pub fn boxed(signatures_required: usize) -> Box<dyn TransactionBuilder> {
        Box::new(Self {
            size: 250,
            signatures_required,
        })
    }

    fn hashes(&self, transaction: &TransactionData, wallet: &Wallet) -> Vec<Vec<u8>> {
        let fee = transaction
            .fee
            .as_ref()
            .map(|fee| fee.amount().value.to_string())
            .unwrap_or_default();
        (0..self.signatures_required)
            .map(|i| {
                format!(
                    "{i}|{}|{}|{}|{fee}|{:?}",
                    transaction.source_address,
                    transaction.destination_address,
                    transaction.amount.value,
                    wallet.nonce
                )
                .into_bytes()
            })
            .collect()
    }
}

impl TransactionBuilder for StubBuilder {
    fn build_for_sign(
        &self,
        transaction: &TransactionData,
        wallet: &Wallet,
    ) -> Result<Vec<Vec<u8>>, BuildError> {
        if transaction.amount.value > wallet.funds_available(&transaction.amount.amount_type) {
            return Err(BuildError::InvalidTransaction("amount exceeds balance".to_string()));
        }
        Ok(self.hashes(transaction, wallet))
    }

    fn build_for_send(
        &self,
        transaction: &TransactionData,
        wallet: &Wallet,
        signatures: &[Vec<u8>],
    ) -> Result<SignedTransaction, BuildError> {
        let mut raw = Vec::new();
        for (hash, signature) in self.hashes(transaction, wallet).iter().zip(signatures) {
            raw.extend_from_slice(hash);
            raw.extend_from_slice(signature);
        }
        Ok(SignedTransaction::new(raw))
    }

    fn estimate_size(
        &self,
        _transaction: &TransactionData,
        _wallet: &Wallet,
    ) -> Result<u64, BuildError> {
        Ok(self.size)
    }
}

#[derive(Default)]
pub struct StubSigner {
    pub fail_with: Option<SignerError>,
    pub drop_one: bool,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl StubSigner {
    pub fn failing(error: SignerError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    /// Returns one signature fewer than requested from a batch.
    pub fn dropping_one() -> Self {
        Self {
            drop_one: true,
            ..Default::default()
        }
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn signature(hash: &[u8], public_key: &PublicKey) -> Vec<u8> {
        hash.iter()
            .rev()
            .chain(public_key.blockchain_key.iter())
            .copied()
            .collect()
    }
}

#[async_trait]
impl TransactionSigner for StubSigner {
    async fn sign(&self, hash: &[u8], public_key: &PublicKey) -> Result<Vec<u8>, SignerError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.fail_with.as_ref() {
            return Err(e.clone());
        }
        Ok(Self::signature(hash, public_key))
    }

    async fn sign_batch(
        &self,
        hashes: &[Vec<u8>],
        public_key: &PublicKey,
    ) -> Result<Vec<Vec<u8>>, SignerError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.fail_with.as_ref() {
            return Err(e.clone());
        }
        let mut signatures: Vec<_> = hashes
            .iter()
            .map(|hash| Self::signature(hash, public_key))
            .collect();
        if self.drop_one {
            signatures.pop();
        }
        Ok(signatures)
    }
}

pub const ADDRESS_A: &str = "bc1qaddressa";
pub const ADDRESS_B: &str = "bc1qaddressb";
pub const ETH_ADDRESS: &str = "0x00000000000000000000000000000000000000aa";

pub fn bitcoin_wallet(addresses: &[&str]) -> Wallet {
    Wallet::new(
        Blockchain::Bitcoin,
        PublicKey::new(vec![2; 33]),
        addresses.iter().map(|a| Address::new(*a)).collect(),
    )
}

pub fn ethereum_wallet() -> Wallet {
    Wallet::new(
        Blockchain::Ethereum,
        PublicKey::new(vec![4; 65]),
        vec![Address::new(ETH_ADDRESS)],
    )
}

pub fn utxo(address: &str, hash: &str, amount: Decimal) -> UnspentOutput {
    UnspentOutput {
        transaction_hash: hash.to_string(),
        output_index: 0,
        amount,
        address: address.to_string(),
        output_script: None,
        derivation_path: None,
    }
}

/// An address holding one output per value, with a consistent balance.
pub fn address_info(
    address: &str,
    values: &[Decimal],
    recent_transactions: Vec<BasicTransactionData>,
    has_unconfirmed: Option<bool>,
) -> BitcoinAddressInfo {
    let unspent_outputs: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, value)| utxo(address, &format!("{address}-{i}"), *value))
        .collect();
    BitcoinAddressInfo {
        balance: values.iter().copied().sum(),
        unspent_outputs,
        recent_transactions,
        has_unconfirmed,
    }
}

pub fn basic_tx(hash: &str, balance_dif: Decimal, is_confirmed: bool) -> BasicTransactionData {
    BasicTransactionData {
        balance_dif,
        hash: hash.to_string(),
        date: None,
        is_confirmed,
        source: None,
        destination: None,
    }
}

pub fn bitcoin_chain(
    providers: &[Arc<StubBitcoinProvider>],
    signatures_required: usize,
) -> anyhow::Result<BitcoinChain> {
    let providers = providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn BitcoinNetworkProvider>)
        .collect();
    let params = BitcoinParams::preset(Blockchain::Bitcoin).expect("bitcoin preset");
    Ok(BitcoinChain::new(
        Blockchain::Bitcoin,
        params,
        providers,
        StubBuilder::boxed(signatures_required),
    )?)
}

pub fn bitcoin_manager(
    providers: &[Arc<StubBitcoinProvider>],
    wallet: Wallet,
) -> anyhow::Result<WalletManager<BitcoinChain>> {
    let chain = bitcoin_chain(providers, 1)?;
    Ok(WalletManager::new(wallet, chain, ManagerConfig::default())?)
}

pub fn ethereum_chain(providers: &[Arc<StubEthereumProvider>]) -> anyhow::Result<EthereumChain> {
    let providers = providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn EthereumNetworkProvider>)
        .collect();
    Ok(EthereumChain::new(
        Blockchain::Ethereum,
        GasFeeConfig::default(),
        providers,
        StubBuilder::boxed(1),
    )?)
}

pub fn ethereum_manager(
    providers: &[Arc<StubEthereumProvider>],
) -> anyhow::Result<WalletManager<EthereumChain>> {
    let chain = ethereum_chain(providers)?;
    Ok(WalletManager::new(
        ethereum_wallet(),
        chain,
        ManagerConfig::default(),
    )?)
}

pub fn btc(value: Decimal) -> Amount {
    Amount::coin(Blockchain::Bitcoin, value)
}

pub fn eth(value: Decimal) -> Amount {
    Amount::coin(Blockchain::Ethereum, value)
}
