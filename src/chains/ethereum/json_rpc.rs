use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;

use std::{
    num::IntErrorKind,
    sync::atomic::{AtomicU64, Ordering},
};

use super::network::*;
use crate::{
    config::ConfigError,
    error::DomainError,
    network::{build_http_client, ClientConfig, NetworkError, NetworkProvider},
    primitives::Token,
};

const BALANCE_OF_SELECTOR: &str = "70a08231";
const TRANSFER_SELECTOR: &str = "a9059cbb";
const INSUFFICIENT_FUNDS: &str = "insufficient funds";

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// Ethereum JSON-RPC endpoint (self-hosted node, Infura and similar gateways).
pub struct JsonRpcProvider {
    base_url: String,
    client: ClientWithMiddleware,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(url: Url, config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: url.to_string(),
            client: build_http_client(config)?,
            next_id: AtomicU64::new(1),
        })
    }

    #[instrument(name = "json_rpc.call", skip(self, params), fields(host = %self.base_url), err)]
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, NetworkError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let resp = self.client.post(&self.base_url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(NetworkError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        let response: RpcResponse<T> = serde_json::from_str(&text)?;
        match (response.result, response.error) {
            (_, Some(error)) => Err(rpc_error(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(NetworkError::CouldNotDecodeResponseBody(format!(
                "{method}: response has neither result nor error"
            ))),
        }
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<u128, NetworkError> {
        let quantity: String = self.call(method, params).await?;
        parse_quantity(&quantity)
    }
}

fn rpc_error(error: RpcError) -> NetworkError {
    if error.message.to_lowercase().contains(INSUFFICIENT_FUNDS) {
        return DomainError::InsufficientFunds.into();
    }
    NetworkError::Rpc {
        code: error.code,
        message: error.message,
    }
}

/// Decodes a `0x`-prefixed hex quantity or 32-byte word.
pub fn parse_quantity(quantity: &str) -> Result<u128, NetworkError> {
    let digits = quantity.trim_start_matches("0x").trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => {
            NetworkError::ValueOutOfRange(format!("{quantity} exceeds u128"))
        }
        _ => NetworkError::CouldNotDecodeResponseBody(format!("{quantity}: {e}")),
    })
}

fn encode_quantity(value: u128) -> String {
    format!("{value:#x}")
}

fn pad_word(hex_value: &str) -> String {
    format!("{:0>64}", hex_value.trim_start_matches("0x").to_lowercase())
}

/// Call data for `balanceOf(address)`.
pub fn balance_of_data(address: &str) -> String {
    format!("0x{BALANCE_OF_SELECTOR}{}", pad_word(address))
}

/// Call data for `transfer(address,uint256)`.
pub fn transfer_data(destination: &str, value: u128) -> String {
    format!(
        "0x{TRANSFER_SELECTOR}{}{}",
        pad_word(destination),
        pad_word(&format!("{value:x}"))
    )
}

impl NetworkProvider for JsonRpcProvider {
    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EthereumNetworkProvider for JsonRpcProvider {
    async fn get_balance(&self, address: &str) -> Result<u128, NetworkError> {
        self.call_quantity("eth_getBalance", json!([address, "latest"]))
            .await
    }

    async fn get_token_balance(&self, address: &str, token: &Token) -> Result<u128, NetworkError> {
        self.call_quantity(
            "eth_call",
            json!([
                { "to": token.contract_address, "data": balance_of_data(address) },
                "latest"
            ]),
        )
        .await
    }

    async fn get_tx_count(&self, address: &str) -> Result<u64, NetworkError> {
        let count = self
            .call_quantity("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        to_u64(count)
    }

    async fn get_pending_tx_count(&self, address: &str) -> Result<u64, NetworkError> {
        let count = self
            .call_quantity("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        to_u64(count)
    }

    async fn get_gas_price(&self) -> Result<u128, NetworkError> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn get_gas_limit(&self, request: &GasEstimateRequest) -> Result<u64, NetworkError> {
        let mut call = json!({
            "from": request.from,
            "to": request.to,
            "value": encode_quantity(request.value),
        });
        if let Some(data) = request.data.as_ref() {
            call["data"] = json!(data);
        }
        let gas = self.call_quantity("eth_estimateGas", json!([call])).await?;
        to_u64(gas)
    }

    async fn send_transaction(&self, transaction_hex: &str) -> Result<String, NetworkError> {
        self.call("eth_sendRawTransaction", json!([transaction_hex]))
            .await
    }
}

fn to_u64(value: u128) -> Result<u64, NetworkError> {
    u64::try_from(value).map_err(|_| NetworkError::ValueOutOfRange(format!("{value} exceeds u64")))
}
