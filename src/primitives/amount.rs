use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use std::fmt;

use super::{AmountType, Blockchain, Token};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub amount_type: AmountType,
    pub value: Decimal,
    pub decimals: u32,
    pub currency_symbol: String,
}

impl Amount {
    pub fn coin(blockchain: Blockchain, value: Decimal) -> Self {
        Self {
            amount_type: AmountType::Coin,
            value,
            decimals: blockchain.decimals(),
            currency_symbol: blockchain.currency_symbol().to_string(),
        }
    }

    pub fn zero_coin(blockchain: Blockchain) -> Self {
        Self::coin(blockchain, Decimal::ZERO)
    }

    pub fn token(token: &Token, value: Decimal) -> Self {
        Self {
            amount_type: AmountType::Token(token.clone()),
            value,
            decimals: token.decimals,
            currency_symbol: token.symbol.clone(),
        }
    }

    /// Same asset, different value.
    pub fn with_value(&self, value: Decimal) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub fn is_above_zero(&self) -> bool {
        self.value > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Value in the smallest indivisible unit, truncating anything below it.
    pub fn to_base_units(&self) -> Option<u128> {
        move_point_right(self.value, self.decimals)?
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .to_u128()
    }

    /// The smallest representable value of this asset, e.g. one satoshi.
    pub fn base_unit(&self) -> Decimal {
        move_point_left(Decimal::ONE, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.currency_symbol)
    }
}

pub fn move_point_left(value: Decimal, places: u32) -> Decimal {
    value * Decimal::new(1, places)
}

pub fn move_point_right(value: Decimal, places: u32) -> Option<Decimal> {
    let factor = Decimal::try_from_i128_with_scale(10i128.checked_pow(places)?, 0).ok()?;
    value.checked_mul(factor)
}

/// Exact conversion of an on-chain integer into display units.
pub fn from_base_units(raw: u128, decimals: u32) -> Option<Decimal> {
    let raw = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals).ok()
}
