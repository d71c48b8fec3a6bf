mod error;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use std::{path::Path, time::Duration};

pub use error::ConfigError;

use crate::{fees::GasFeeConfig, network::ClientConfig, primitives::Blockchain, tracing::TracingConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub blockchains: Vec<BlockchainConfig>,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_file = std::fs::read_to_string(path).context("Couldn't read config file")?;
        let config: Config =
            serde_yaml::from_str(&config_file).context("Couldn't parse config file")?;
        Ok(config)
    }

    pub fn blockchain(&self, blockchain: Blockchain) -> Result<&BlockchainConfig, ConfigError> {
        self.blockchains
            .iter()
            .find(|c| c.blockchain == blockchain)
            .ok_or(ConfigError::NotConfigured(blockchain))
    }
}

#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_debounce_window")]
    pub debounce_window: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            debounce_window: default_debounce_window(),
        }
    }
}

fn default_debounce_window() -> Duration {
    Duration::from_secs(10)
}

/// Per-chain settings. Fee and dust fields left empty fall back to the chain's presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainConfig {
    pub blockchain: Blockchain,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub dust_value: Option<Decimal>,
    #[serde(default)]
    pub minimal_fee_per_kb: Option<Decimal>,
    #[serde(default)]
    pub minimal_fee: Option<Decimal>,
    #[serde(default)]
    pub gas: GasFeeConfig,
}

impl BlockchainConfig {
    pub fn new(blockchain: Blockchain, providers: Vec<ProviderConfig>) -> Self {
        Self {
            blockchain,
            providers,
            dust_value: None,
            minimal_fee_per_kb: None,
            minimal_fee: None,
            gas: GasFeeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    Esplora {
        url: String,
    },
    JsonRpc {
        url: String,
    },
    Infura {
        url: String,
        #[serde(default)]
        project_id: Option<String>,
    },
}

impl ProviderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Esplora { .. } => "esplora",
            Self::JsonRpc { .. } => "json_rpc",
            Self::Infura { .. } => "infura",
        }
    }

    /// Fully resolved endpoint, with any credential folded in.
    pub fn endpoint(&self, blockchain: Blockchain) -> Result<Url, ConfigError> {
        match self {
            Self::Esplora { url } | Self::JsonRpc { url } => Ok(Url::parse(url)?),
            Self::Infura { url, project_id } => {
                let project_id = project_id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or(ConfigError::MissingCredential {
                        blockchain,
                        credential: "infura project_id",
                    })?;
                Ok(Url::parse(&format!(
                    "{}/{}",
                    url.trim_end_matches('/'),
                    project_id
                ))?)
            }
        }
    }
}
