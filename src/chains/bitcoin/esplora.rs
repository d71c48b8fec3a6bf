use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use std::collections::HashMap;

use super::network::*;
use crate::{
    config::ConfigError,
    error::DomainError,
    fees::BYTES_IN_KB,
    network::{build_http_client, ClientConfig, NetworkError, NetworkProvider},
    primitives::{from_base_units, Blockchain},
    wallet::{BasicTransactionData, UnspentOutput},
};

const NEXT_BLOCK_TARGET: &str = "1";
const HOUR_TARGET: &str = "6";
const DAY_TARGET: &str = "144";

#[derive(Debug, Clone, Deserialize)]
struct AddressStats {
    spent_txo_count: u64,
    tx_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct AddressResponse {
    chain_stats: AddressStats,
    mempool_stats: AddressStats,
}

#[derive(Debug, Clone, Deserialize)]
struct TxStatus {
    confirmed: bool,
    #[serde(default)]
    block_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct UtxoResponse {
    txid: String,
    vout: u32,
    value: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct TxOut {
    #[serde(default)]
    scriptpubkey_address: Option<String>,
    value: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct TxIn {
    #[serde(default)]
    prevout: Option<TxOut>,
}

#[derive(Debug, Clone, Deserialize)]
struct TxResponse {
    txid: String,
    status: TxStatus,
    vin: Vec<TxIn>,
    vout: Vec<TxOut>,
}

/// Esplora REST endpoint (blockstream.info, mempool.space and self-hosted instances).
pub struct EsploraProvider {
    base_url: String,
    blockchain: Blockchain,
    client: ClientWithMiddleware,
}

impl EsploraProvider {
    pub fn new(
        url: Url,
        blockchain: Blockchain,
        config: &ClientConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            blockchain,
            client: build_http_client(config)?,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NetworkError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn to_coin(&self, sats: u64) -> Result<Decimal, NetworkError> {
        from_base_units(u128::from(sats), self.blockchain.decimals()).ok_or_else(|| {
            NetworkError::ValueOutOfRange(format!("value out of range: {sats}"))
        })
    }

    fn to_basic_transaction(&self, address: &str, tx: TxResponse) -> BasicTransactionData {
        let received: i64 = tx
            .vout
            .iter()
            .filter(|out| out.scriptpubkey_address.as_deref() == Some(address))
            .map(|out| out.value as i64)
            .sum();
        let spent: i64 = tx
            .vin
            .iter()
            .filter_map(|input| input.prevout.as_ref())
            .filter(|prevout| prevout.scriptpubkey_address.as_deref() == Some(address))
            .map(|prevout| prevout.value as i64)
            .sum();
        BasicTransactionData {
            balance_dif: Decimal::new(received - spent, self.blockchain.decimals()),
            date: tx
                .status
                .block_time
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            is_confirmed: tx.status.confirmed,
            source: tx
                .vin
                .iter()
                .find_map(|input| input.prevout.as_ref()?.scriptpubkey_address.clone()),
            destination: tx
                .vout
                .iter()
                .find_map(|out| out.scriptpubkey_address.clone()),
            hash: tx.txid,
        }
    }

    fn per_kb(&self, estimates: &HashMap<String, f64>, target: &str) -> Result<Decimal, NetworkError> {
        let sat_per_vb = estimates.get(target).copied().ok_or_else(|| {
            NetworkError::CouldNotDecodeResponseBody(format!("missing fee estimate for {target}"))
        })?;
        let sat_per_vb = Decimal::try_from(sat_per_vb)
            .map_err(|e| NetworkError::CouldNotDecodeResponseBody(e.to_string()))?;
        let sats_per_kb = sat_per_vb * BYTES_IN_KB;
        Ok(sats_per_kb * Decimal::new(1, self.blockchain.decimals()))
    }
}

impl NetworkProvider for EsploraProvider {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BitcoinNetworkProvider for EsploraProvider {
    #[instrument(name = "esplora.get_info", skip(self), fields(host = %self.base_url), err)]
    async fn get_info(&self, address: &str) -> Result<BitcoinAddressInfo, NetworkError> {
        let stats: AddressResponse = self.get_json(&format!("/address/{address}")).await?;
        let utxos: Vec<UtxoResponse> = self.get_json(&format!("/address/{address}/utxo")).await?;
        let txs: Vec<TxResponse> = self.get_json(&format!("/address/{address}/txs")).await?;

        let mut unspent_outputs = Vec::with_capacity(utxos.len());
        for utxo in utxos {
            unspent_outputs.push(UnspentOutput {
                transaction_hash: utxo.txid,
                output_index: utxo.vout,
                amount: self.to_coin(utxo.value)?,
                address: address.to_string(),
                output_script: None,
                derivation_path: None,
            });
        }
        let balance = unspent_outputs.iter().map(|utxo| utxo.amount).sum();
        let recent_transactions = txs
            .into_iter()
            .map(|tx| self.to_basic_transaction(address, tx))
            .collect();

        Ok(BitcoinAddressInfo {
            balance,
            unspent_outputs,
            recent_transactions,
            has_unconfirmed: Some(stats.mempool_stats.tx_count > 0),
        })
    }

    #[instrument(name = "esplora.get_fee", skip(self), fields(host = %self.base_url), err)]
    async fn get_fee(&self) -> Result<BitcoinFee, NetworkError> {
        let estimates: HashMap<String, f64> = self.get_json("/fee-estimates").await?;
        Ok(BitcoinFee {
            minimal_per_kb: self.per_kb(&estimates, DAY_TARGET)?,
            normal_per_kb: self.per_kb(&estimates, HOUR_TARGET)?,
            priority_per_kb: self.per_kb(&estimates, NEXT_BLOCK_TARGET)?,
        })
    }

    #[instrument(name = "esplora.send_transaction", skip_all, fields(host = %self.base_url), err)]
    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError> {
        let url = format!("{}/tx", self.base_url);
        let resp = self
            .client
            .post(&url)
            .body(transaction_hex.to_string())
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(body.trim().to_string());
        }
        if status.as_u16() == 400 {
            return Err(DomainError::Rejected(body).into());
        }
        Err(NetworkError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    #[instrument(name = "esplora.get_signature_count", skip(self), fields(host = %self.base_url), err)]
    async fn get_signature_count(&self, address: &str) -> Result<u64, NetworkError> {
        let stats: AddressResponse = self.get_json(&format!("/address/{address}")).await?;
        Ok(stats.chain_stats.spent_txo_count + stats.mempool_stats.spent_txo_count)
    }
}
