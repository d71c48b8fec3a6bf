use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local pre-flight findings. Reported together as a set, never first-fail.
#[derive(
    Error, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionError {
    #[error("TransactionError - InvalidAmountValue")]
    InvalidAmountValue,
    #[error("TransactionError - AmountExceedsBalance")]
    AmountExceedsBalance,
    #[error("TransactionError - FeeExceedsBalance")]
    FeeExceedsBalance,
    #[error("TransactionError - TotalExceedsBalance")]
    TotalExceedsBalance,
    #[error("TransactionError - DustAmount")]
    DustAmount,
    #[error("TransactionError - DustChange")]
    DustChange,
}
