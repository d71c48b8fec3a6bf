use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Multipliers applied to a base gas estimate (minimum tier is always ×1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasFeeConfig {
    #[serde(default = "default_normal_multiplier")]
    pub normal_multiplier: Decimal,
    #[serde(default = "default_priority_multiplier")]
    pub priority_multiplier: Decimal,
    /// Inflates the node's gas estimate before pricing, for chains that under-estimate.
    #[serde(default)]
    pub gas_limit_multiplier: Option<Decimal>,
    /// Floor for the gas price in wei.
    #[serde(default)]
    pub minimal_gas_price: Option<Decimal>,
}

impl Default for GasFeeConfig {
    fn default() -> Self {
        Self {
            normal_multiplier: default_normal_multiplier(),
            priority_multiplier: default_priority_multiplier(),
            gas_limit_multiplier: None,
            minimal_gas_price: None,
        }
    }
}

fn default_normal_multiplier() -> Decimal {
    dec!(1.2)
}

fn default_priority_multiplier() -> Decimal {
    dec!(1.5)
}
