use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::Amount;

/// The fee attached to a concrete transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fee {
    Common(Amount),
    Gas {
        amount: Amount,
        gas_limit: u64,
        /// Price per unit of gas in the chain's base unit (wei).
        gas_price: Decimal,
    },
}

impl Fee {
    pub fn amount(&self) -> &Amount {
        match self {
            Self::Common(amount) => amount,
            Self::Gas { amount, .. } => amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTier {
    Minimum,
    Normal,
    Priority,
}

/// Fee options offered for a would-be transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionFee {
    Single(Fee),
    Choosable {
        minimum: Fee,
        normal: Fee,
        priority: Fee,
    },
}

impl TransactionFee {
    /// Builds three tiers, returning `None` unless `minimum <= normal <= priority`.
    pub fn choosable(minimum: Fee, normal: Fee, priority: Fee) -> Option<Self> {
        let ordered = minimum.amount().value <= normal.amount().value
            && normal.amount().value <= priority.amount().value;
        ordered.then_some(Self::Choosable {
            minimum,
            normal,
            priority,
        })
    }

    pub fn tier(&self, tier: FeeTier) -> &Fee {
        match (self, tier) {
            (Self::Single(fee), _) => fee,
            (Self::Choosable { minimum, .. }, FeeTier::Minimum) => minimum,
            (Self::Choosable { normal, .. }, FeeTier::Normal) => normal,
            (Self::Choosable { priority, .. }, FeeTier::Priority) => priority,
        }
    }

    pub fn normal(&self) -> &Fee {
        self.tier(FeeTier::Normal)
    }
}
