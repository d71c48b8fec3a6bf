use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    config::{BlockchainConfig, ConfigError},
    primitives::Blockchain,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitcoinParams {
    pub minimal_fee_per_kb: Decimal,
    pub minimal_fee: Decimal,
    pub dust_value: Option<Decimal>,
}

impl BitcoinParams {
    pub fn preset(blockchain: Blockchain) -> Option<Self> {
        match blockchain {
            Blockchain::Bitcoin | Blockchain::BitcoinTestnet | Blockchain::Litecoin => Some(Self {
                minimal_fee_per_kb: dec!(0.0001),
                minimal_fee: dec!(0.00001),
                dust_value: None,
            }),
            Blockchain::Dogecoin => Some(Self {
                minimal_fee_per_kb: dec!(0.01),
                minimal_fee: dec!(0.01),
                dust_value: Some(dec!(0.01)),
            }),
            Blockchain::Ethereum | Blockchain::EthereumTestnet => None,
        }
    }

    /// The chain preset with any configured values taking precedence.
    pub fn from_config(config: &BlockchainConfig) -> Result<Self, ConfigError> {
        let preset =
            Self::preset(config.blockchain).ok_or_else(|| ConfigError::UnsupportedProvider {
                blockchain: config.blockchain,
                provider: "bitcoin".to_string(),
            })?;
        Ok(Self {
            minimal_fee_per_kb: config
                .minimal_fee_per_kb
                .unwrap_or(preset.minimal_fee_per_kb),
            minimal_fee: config.minimal_fee.unwrap_or(preset.minimal_fee),
            dust_value: config.dust_value.or(preset.dust_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence() {
        let mut config = BlockchainConfig::new(Blockchain::Dogecoin, vec![]);
        config.minimal_fee = Some(dec!(1));
        let params = BitcoinParams::from_config(&config).unwrap();
        assert_eq!(params.minimal_fee, dec!(1));
        assert_eq!(params.minimal_fee_per_kb, dec!(0.01));
        assert_eq!(params.dust_value, Some(dec!(0.01)));
    }

    #[test]
    fn account_chains_have_no_preset() {
        let config = BlockchainConfig::new(Blockchain::Ethereum, vec![]);
        assert!(matches!(
            BitcoinParams::from_config(&config),
            Err(ConfigError::UnsupportedProvider { .. })
        ));
    }
}
