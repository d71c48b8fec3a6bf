mod json_rpc;
mod network;

use async_trait::async_trait;
use futures::future::try_join_all;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::instrument;

use std::sync::Arc;

pub use json_rpc::{balance_of_data, parse_quantity, transfer_data, JsonRpcProvider};
pub use network::*;

use crate::{
    config::{BlockchainConfig, ConfigError, ProviderConfig},
    error::DomainError,
    fees::{adjusted_gas_limit, gas_fee_tiers, GasFeeConfig},
    manager::{
        SignatureCountValidator, SignedTransaction, TokenFinder, TransactionBuilder, WalletChain,
        WalletManagerError,
    },
    network::{ClientConfig, MultiProvider, NetworkError},
    primitives::{from_base_units, move_point_left, Amount, Blockchain},
    wallet::{Fee, TransactionFee, Wallet},
};

/// Strategy for account-model chains with a single address, gas fees and ERC-20 tokens.
pub struct EthereumChain {
    blockchain: Blockchain,
    gas: GasFeeConfig,
    provider: MultiProvider<dyn EthereumNetworkProvider>,
    token_indexer: Option<Arc<dyn EthereumTokenIndexer>>,
    builder: Box<dyn TransactionBuilder>,
}

impl EthereumChain {
    pub fn new(
        blockchain: Blockchain,
        gas: GasFeeConfig,
        providers: Vec<Arc<dyn EthereumNetworkProvider>>,
        builder: Box<dyn TransactionBuilder>,
    ) -> Result<Self, ConfigError> {
        if blockchain.is_utxo_model() {
            return Err(ConfigError::UnsupportedProvider {
                blockchain,
                provider: "ethereum".to_string(),
            });
        }
        Ok(Self {
            blockchain,
            gas,
            provider: MultiProvider::new(providers)?,
            token_indexer: None,
            builder,
        })
    }

    pub fn from_config(
        config: &BlockchainConfig,
        client: &ClientConfig,
        builder: Box<dyn TransactionBuilder>,
    ) -> Result<Self, ConfigError> {
        let mut providers: Vec<Arc<dyn EthereumNetworkProvider>> = Vec::new();
        for provider in config.providers.iter() {
            match provider {
                ProviderConfig::JsonRpc { .. } | ProviderConfig::Infura { .. } => {
                    let url = provider.endpoint(config.blockchain)?;
                    providers.push(Arc::new(JsonRpcProvider::new(url, client)?));
                }
                other => {
                    return Err(ConfigError::UnsupportedProvider {
                        blockchain: config.blockchain,
                        provider: other.kind().to_string(),
                    })
                }
            }
        }
        Self::new(config.blockchain, config.gas.clone(), providers, builder)
    }

    pub fn with_token_indexer(mut self, indexer: Arc<dyn EthereumTokenIndexer>) -> Self {
        self.token_indexer = Some(indexer);
        self
    }

    pub fn provider(&self) -> &MultiProvider<dyn EthereumNetworkProvider> {
        &self.provider
    }

    fn coin_from_wei(&self, wei: u128) -> Result<Decimal, NetworkError> {
        from_base_units(wei, self.blockchain.decimals())
            .ok_or_else(|| NetworkError::ValueOutOfRange(format!("balance out of range: {wei}")))
    }

    fn gas_request(
        &self,
        wallet: &Wallet,
        amount: &Amount,
        destination: &str,
    ) -> Result<GasEstimateRequest, WalletManagerError> {
        let value = amount.to_base_units().ok_or_else(|| {
            DomainError::Unsupported(format!("amount not representable: {amount}"))
        })?;
        let from = wallet.address().to_string();
        Ok(match amount.amount_type.token() {
            Some(token) => GasEstimateRequest {
                from,
                to: token.contract_address.clone(),
                value: 0,
                data: Some(transfer_data(destination, value)),
            },
            None => GasEstimateRequest {
                from,
                to: destination.to_string(),
                value,
                data: None,
            },
        })
    }
}

/// Network view of the wallet's account, with values already in display units.
#[derive(Debug, Clone, PartialEq)]
pub struct EthereumUpdate {
    pub coin_balance: Decimal,
    pub token_balances: Vec<Amount>,
    pub tx_count: u64,
    pub pending_tx_count: u64,
}

#[async_trait]
impl WalletChain for EthereumChain {
    type Update = EthereumUpdate;

    fn blockchain(&self) -> Blockchain {
        self.blockchain
    }

    fn current_host(&self) -> String {
        self.provider.current_host()
    }

    #[instrument(name = "ethereum.fetch_update", skip_all, fields(blockchain = %self.blockchain, n_tokens = wallet.tokens().len()), err)]
    async fn fetch_update(&self, wallet: &Wallet) -> Result<EthereumUpdate, NetworkError> {
        let address = wallet.address();
        let balance = self
            .provider
            .perform_request(move |provider| async move { provider.get_balance(address).await });
        let tx_count = self
            .provider
            .perform_request(move |provider| async move { provider.get_tx_count(address).await });
        let pending_tx_count = self.provider.perform_request(move |provider| async move {
            provider.get_pending_tx_count(address).await
        });
        let token_balances = try_join_all(wallet.tokens().iter().map(|token| async move {
            let value = self
                .provider
                .perform_request(move |provider| async move {
                    provider.get_token_balance(address, token).await
                })
                .await
                .and_then(|raw| token_value(raw, token.decimals));
            match value {
                Ok(value) => Ok(Some(Amount::token(token, value))),
                // Keeps the token's previous value.
                Err(NetworkError::ValueOutOfRange(reason)) => {
                    tracing::warn!(
                        token = %token.symbol,
                        %reason,
                        "skipping unrepresentable token balance"
                    );
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }));

        let (balance, tx_count, pending_tx_count, token_balances) =
            futures::try_join!(balance, tx_count, pending_tx_count, token_balances)?;
        Ok(EthereumUpdate {
            coin_balance: self.coin_from_wei(balance)?,
            token_balances: token_balances.into_iter().flatten().collect(),
            tx_count,
            pending_tx_count,
        })
    }

    fn commit(&self, wallet: &mut Wallet, update: EthereumUpdate) {
        tracing::debug!(blockchain = %self.blockchain, balance = %update.coin_balance, "committing update");
        wallet.set_coin_value(update.coin_balance);
        // Tokens removed while the fetch was in flight stay removed.
        for amount in update.token_balances {
            if let Some(token) = amount.amount_type.token() {
                let tracked = wallet
                    .tokens()
                    .iter()
                    .any(|t| t.contract_address.eq_ignore_ascii_case(&token.contract_address));
                if tracked {
                    wallet.set_token_value(token, amount.value);
                }
            }
        }
        wallet.nonce = Some(update.tx_count);
        if update.tx_count == update.pending_tx_count {
            wallet.confirm_all();
        } else {
            wallet.add_transaction_dummy();
        }
    }

    #[instrument(name = "ethereum.fee", skip(self, wallet), fields(blockchain = %self.blockchain), err)]
    async fn fee(
        &self,
        wallet: &Wallet,
        amount: &Amount,
        destination: &str,
    ) -> Result<TransactionFee, WalletManagerError> {
        let request = self.gas_request(wallet, amount, destination)?;
        let request = &request;
        let gas_limit = self
            .provider
            .perform_request(move |provider| async move { provider.get_gas_limit(request).await });
        let gas_price = self
            .provider
            .perform_request(|provider| async move { provider.get_gas_price().await });
        let (gas_limit, gas_price) = futures::try_join!(gas_limit, gas_price)?;

        let gas_limit = adjusted_gas_limit(gas_limit, &self.gas);
        let gas_price = from_base_units(gas_price, 0).ok_or_else(|| {
            NetworkError::ValueOutOfRange(format!("gas price out of range: {gas_price}"))
        })?;
        let out_of_range = || {
            NetworkError::ValueOutOfRange(format!("fee for {gas_limit} gas at {gas_price} overflows"))
        };
        let tiers = gas_fee_tiers(gas_limit, gas_price, &self.gas).ok_or_else(out_of_range)?;
        let base_price = match self.gas.minimal_gas_price {
            Some(minimal) => gas_price.max(minimal),
            None => gas_price,
        };
        let prices = [Decimal::ONE, self.gas.normal_multiplier, self.gas.priority_multiplier]
            .map(|multiplier| base_price.checked_mul(multiplier));
        let [Some(minimum_price), Some(normal_price), Some(priority_price)] = prices else {
            return Err(out_of_range().into());
        };
        let [minimum, normal, priority] = [
            (tiers[0], minimum_price),
            (tiers[1], normal_price),
            (tiers[2], priority_price),
        ]
        .map(|(fee, price)| Fee::Gas {
            amount: Amount::coin(self.blockchain, move_point_left(fee, self.blockchain.decimals())),
            gas_limit,
            gas_price: price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        });
        Ok(TransactionFee::Choosable {
            minimum,
            normal,
            priority,
        })
    }

    #[instrument(name = "ethereum.broadcast", skip_all, fields(blockchain = %self.blockchain), err)]
    async fn broadcast(&self, transaction: &SignedTransaction) -> Result<String, NetworkError> {
        let transaction_hex = format!("0x{}", transaction.to_hex());
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

    fn token_finder(&self) -> Option<&dyn TokenFinder> {
        self.token_indexer.as_ref().map(|_| self as &dyn TokenFinder)
    }
}

#[async_trait]
impl SignatureCountValidator for EthereumChain {
    #[instrument(name = "ethereum.signature_count", skip_all, fields(blockchain = %self.blockchain), err)]
    async fn signature_count(&self, wallet: &Wallet) -> Result<u64, NetworkError> {
        let address = wallet.address();
        self.provider
            .perform_request(move |provider| async move { provider.get_tx_count(address).await })
            .await
    }
}

#[async_trait]
impl TokenFinder for EthereumChain {
    #[instrument(name = "ethereum.find_tokens", skip_all, fields(blockchain = %self.blockchain), err)]
    async fn find_tokens(&self, wallet: &Wallet) -> Result<Vec<Amount>, NetworkError> {
        let Some(indexer) = self.token_indexer.as_ref() else {
            return Ok(Vec::new());
        };
        let found = indexer.find_erc20_tokens(wallet.address()).await?;
        let mut amounts = Vec::with_capacity(found.len());
        for (token, raw) in found {
            match token_value(raw, token.decimals) {
                Ok(value) => amounts.push(Amount::token(&token, value)),
                Err(e) => {
                    tracing::warn!(token = %token.symbol, error = %e, "skipping discovered token");
                }
            }
        }
        Ok(amounts)
    }
}

fn token_value(raw: u128, decimals: u32) -> Result<Decimal, NetworkError> {
    from_base_units(raw, decimals)
        .ok_or_else(|| NetworkError::ValueOutOfRange(format!("token balance out of range: {raw}")))
}
