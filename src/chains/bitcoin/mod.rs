mod esplora;
mod merge;
mod network;
mod params;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::instrument;

use std::sync::Arc;

pub use esplora::EsploraProvider;
pub use merge::merge_address_infos;
pub use network::*;
pub use params::BitcoinParams;

use crate::{
    config::{BlockchainConfig, ConfigError, ProviderConfig},
    fees::utxo_fee_tiers,
    manager::{
        SignatureCountValidator, SignedTransaction, TransactionBuilder, WalletChain,
        WalletManagerError,
    },
    network::{ClientConfig, MultiProvider, NetworkError},
    primitives::{Amount, Blockchain, TransactionStatus},
    wallet::{Fee, TransactionData, TransactionFee, Wallet},
};

/// Strategy for Bitcoin-family chains where the wallet may span several addresses.
pub struct BitcoinChain {
    blockchain: Blockchain,
    params: BitcoinParams,
    provider: MultiProvider<dyn BitcoinNetworkProvider>,
    builder: Box<dyn TransactionBuilder>,
}

impl BitcoinChain {
    pub fn new(
        blockchain: Blockchain,
        params: BitcoinParams,
        providers: Vec<Arc<dyn BitcoinNetworkProvider>>,
        builder: Box<dyn TransactionBuilder>,
    ) -> Result<Self, ConfigError> {
        if !blockchain.is_utxo_model() {
            return Err(ConfigError::UnsupportedProvider {
                blockchain,
                provider: "bitcoin".to_string(),
            });
        }
        Ok(Self {
            blockchain,
            params,
            provider: MultiProvider::new(providers)?,
            builder,
        })
    }

    pub fn from_config(
        config: &BlockchainConfig,
        client: &ClientConfig,
        builder: Box<dyn TransactionBuilder>,
    ) -> Result<Self, ConfigError> {
        let mut providers: Vec<Arc<dyn BitcoinNetworkProvider>> = Vec::new();
        for provider in config.providers.iter() {
            match provider {
                ProviderConfig::Esplora { .. } => {
                    let url = provider.endpoint(config.blockchain)?;
                    providers.push(Arc::new(EsploraProvider::new(url, config.blockchain, client)?));
                }
                other => {
                    return Err(ConfigError::UnsupportedProvider {
                        blockchain: config.blockchain,
                        provider: other.kind().to_string(),
                    })
                }
            }
        }
        Self::new(
            config.blockchain,
            BitcoinParams::from_config(config)?,
            providers,
            builder,
        )
    }

    pub fn params(&self) -> &BitcoinParams {
        &self.params
    }

    pub fn provider(&self) -> &MultiProvider<dyn BitcoinNetworkProvider> {
        &self.provider
    }

    /// A stand-in spend used to measure size: one base unit is moved from the amount to
    /// the fee so the draft never exceeds the balance being priced.
    fn size_draft(&self, wallet: &Wallet, amount: &Amount, destination: &str) -> TransactionData {
        let fee = amount.base_unit();
        TransactionData {
            amount: amount.with_value(amount.value - fee),
            fee: Some(Fee::Common(Amount::coin(self.blockchain, fee))),
            source_address: wallet.address().to_string(),
            destination_address: destination.to_string(),
            contract_address: None,
            status: TransactionStatus::Unconfirmed,
            hash: None,
            date: Utc::now(),
        }
    }
}

#[async_trait]
impl WalletChain for BitcoinChain {
    type Update = BitcoinAddressInfo;

    fn blockchain(&self) -> Blockchain {
        self.blockchain
    }

    fn current_host(&self) -> String {
        self.provider.current_host()
    }

    fn dust_value(&self) -> Option<Decimal> {
        self.params.dust_value
    }

    #[instrument(
        name = "bitcoin.fetch_update",
        skip_all,
        fields(blockchain = %self.blockchain, n_addresses = wallet.addresses().len()),
        err
    )]
    async fn fetch_update(&self, wallet: &Wallet) -> Result<BitcoinAddressInfo, NetworkError> {
        let infos = try_join_all(wallet.addresses().iter().map(|address| {
            let address = address.value.as_str();
            self.provider
                .perform_request(move |provider| async move { provider.get_info(address).await })
        }))
        .await?;
        Ok(merge_address_infos(infos))
    }

    fn commit(&self, wallet: &mut Wallet, update: BitcoinAddressInfo) {
        tracing::debug!(blockchain = %self.blockchain, balance = %update.balance, "committing update");
        wallet.set_coin_value(update.balance);
        wallet.outputs_count = Some(update.unspent_outputs.len());
        wallet.unspent_outputs = update.unspent_outputs;
        if !update.recent_transactions.is_empty() {
            wallet.update_recent_transactions_basic(update.recent_transactions);
        } else {
            match update.has_unconfirmed {
                Some(true) => wallet.add_transaction_dummy(),
                Some(false) => wallet.recent_transactions.clear(),
                None => {}
            }
        }
    }

    #[instrument(name = "bitcoin.fee", skip(self, wallet), fields(blockchain = %self.blockchain), err)]
    async fn fee(
        &self,
        wallet: &Wallet,
        amount: &Amount,
        destination: &str,
    ) -> Result<TransactionFee, WalletManagerError> {
        let rates = self
            .provider
            .perform_request(|provider| async move { provider.get_fee().await })
            .await?;
        let draft = self.size_draft(wallet, amount, destination);
        let size = self.builder.estimate_size(&draft, wallet)?;
        let [minimum, normal, priority] = utxo_fee_tiers(
            [rates.minimal_per_kb, rates.normal_per_kb, rates.priority_per_kb],
            self.params.minimal_fee_per_kb,
            self.params.minimal_fee,
            size,
        )
        .ok_or_else(|| NetworkError::ValueOutOfRange(format!("fee for {size} bytes overflows")))?;
        let fee = |value| Fee::Common(Amount::coin(self.blockchain, value));
        Ok(TransactionFee::Choosable {
            minimum: fee(minimum),
            normal: fee(normal),
            priority: fee(priority),
        })
    }

    #[instrument(name = "bitcoin.broadcast", skip_all, fields(blockchain = %self.blockchain), err)]
    async fn broadcast(&self, transaction: &SignedTransaction) -> Result<String, NetworkError> {
        let transaction_hex = transaction.to_hex();
        let transaction_hex = transaction_hex.as_str();
        self.provider
            .perform_request(move |provider| async move {
                provider.send_transaction(transaction_hex).await
            })
            .await
    }

    fn transaction_builder(&self) -> &dyn TransactionBuilder {
        self.builder.as_ref()
    }

    fn signature_count_validator(&self) -> Option<&dyn SignatureCountValidator> {
        Some(self)
    }
}

#[async_trait]
impl SignatureCountValidator for BitcoinChain {
    #[instrument(name = "bitcoin.signature_count", skip_all, fields(blockchain = %self.blockchain), err)]
    async fn signature_count(&self, wallet: &Wallet) -> Result<u64, NetworkError> {
        let counts = try_join_all(wallet.addresses().iter().map(|address| {
            let address = address.value.as_str();
            self.provider.perform_request(move |provider| async move {
                provider.get_signature_count(address).await
            })
        }))
        .await?;
        Ok(counts.into_iter().sum())
    }
}
