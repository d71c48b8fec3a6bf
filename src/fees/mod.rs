mod config;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

pub use config::*;

pub const BYTES_IN_KB: Decimal = dec!(1024);
const UTXO_FEE_DECIMALS: u32 = 8;

/// `max(fee_per_kb, minimal_fee_per_kb) / 1024 × size`, floored to 8 places, then floored
/// against `minimal_fee`. `None` when the product leaves the decimal range.
pub fn calculate_utxo_fee(
    fee_per_kb: Decimal,
    minimal_fee_per_kb: Decimal,
    minimal_fee: Decimal,
    transaction_size: u64,
) -> Option<Decimal> {
    let fee_per_kb = fee_per_kb.max(minimal_fee_per_kb);
    let calculated = (fee_per_kb / BYTES_IN_KB)
        .checked_mul(Decimal::from(transaction_size))?
        .round_dp_with_strategy(UTXO_FEE_DECIMALS, RoundingStrategy::ToZero);
    Some(calculated.max(minimal_fee))
}

/// Three per-kB rates priced for one transaction size, ordered minimum ≤ normal ≤ priority.
pub fn utxo_fee_tiers(
    [minimum, normal, priority]: [Decimal; 3],
    minimal_fee_per_kb: Decimal,
    minimal_fee: Decimal,
    transaction_size: u64,
) -> Option<[Decimal; 3]> {
    let fee = |rate| calculate_utxo_fee(rate, minimal_fee_per_kb, minimal_fee, transaction_size);
    Some(ordered([fee(minimum)?, fee(normal)?, fee(priority)?]))
}

/// Inflates a node's gas estimate, rounding up to whole gas units.
pub fn adjusted_gas_limit(gas_limit: u64, config: &GasFeeConfig) -> u64 {
    config
        .gas_limit_multiplier
        .and_then(|multiplier| Decimal::from(gas_limit).checked_mul(multiplier))
        .and_then(|limit| limit.ceil().to_u64())
        .unwrap_or(gas_limit)
}

/// `gas_limit × gas_price` with the configured tier multipliers, in base units, rounded
/// half-up to whole units. `None` when any tier leaves the decimal range.
pub fn gas_fee_tiers(
    gas_limit: u64,
    gas_price: Decimal,
    config: &GasFeeConfig,
) -> Option<[Decimal; 3]> {
    let gas_price = match config.minimal_gas_price {
        Some(minimal) => gas_price.max(minimal),
        None => gas_price,
    };
    let minimum = gas_price.checked_mul(Decimal::from(gas_limit))?;
    let tier = |multiplier: Decimal| {
        minimum
            .checked_mul(multiplier)
            .map(|fee| fee.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    };
    Some(ordered([
        tier(Decimal::ONE)?,
        tier(config.normal_multiplier)?,
        tier(config.priority_multiplier)?,
    ]))
}

fn ordered([minimum, normal, priority]: [Decimal; 3]) -> [Decimal; 3] {
    let normal = normal.max(minimum);
    let priority = priority.max(normal);
    [minimum, normal, priority]
}
