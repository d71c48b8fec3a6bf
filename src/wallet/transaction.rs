use chrono::{DateTime, Utc};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fee::Fee;
use crate::primitives::*;

pub const UNKNOWN_ADDRESS: &str = "unknown";

#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub amount: Amount,
    #[builder(default, setter(strip_option))]
    pub fee: Option<Fee>,
    #[builder(setter(into))]
    pub source_address: String,
    #[builder(setter(into))]
    pub destination_address: String,
    #[builder(default, setter(strip_option, into))]
    pub contract_address: Option<String>,
    #[builder(default = "TransactionStatus::Unconfirmed")]
    pub status: TransactionStatus,
    #[builder(default, setter(strip_option, into))]
    pub hash: Option<String>,
    #[builder(default = "Utc::now()")]
    pub date: DateTime<Utc>,
}

impl TransactionData {
    pub fn builder() -> TransactionDataBuilder {
        TransactionDataBuilder::default()
    }

    pub fn has_hash(&self, hash: &str) -> bool {
        self.hash
            .as_deref()
            .map(|own| own.eq_ignore_ascii_case(hash))
            .unwrap_or(false)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }
}

/// A history entry as reported by a network endpoint for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicTransactionData {
    /// Net effect on the queried address(es): positive for incoming value.
    pub balance_dif: Decimal,
    pub hash: String,
    pub date: Option<DateTime<Utc>>,
    pub is_confirmed: bool,
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl BasicTransactionData {
    pub fn to_transaction_data(&self, coin: &Amount) -> TransactionData {
        TransactionData {
            amount: coin.with_value(self.balance_dif.abs()),
            fee: None,
            source_address: self
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            destination_address: self
                .destination
                .clone()
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            contract_address: None,
            status: if self.is_confirmed {
                TransactionStatus::Confirmed
            } else {
                TransactionStatus::Unconfirmed
            },
            hash: Some(self.hash.clone()),
            date: self.date.unwrap_or_else(Utc::now),
        }
    }
}
