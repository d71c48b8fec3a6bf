use rust_decimal::Decimal;

use super::network::BitcoinAddressInfo;
use crate::wallet::BasicTransactionData;

/// Folds per-address results into one view of the wallet.
///
/// Balances are summed and unspent outputs concatenated. Entries sharing a hash are
/// coalesced in first-seen order with their deltas net-summed, so a transfer between two
/// of the wallet's own addresses shows only its external effect. `has_unconfirmed` is
/// unknown as soon as one address reports unknown.
pub fn merge_address_infos(infos: Vec<BitcoinAddressInfo>) -> BitcoinAddressInfo {
    let mut merged = BitcoinAddressInfo {
        balance: Decimal::ZERO,
        unspent_outputs: Vec::new(),
        recent_transactions: Vec::new(),
        has_unconfirmed: Some(false),
    };

    for info in infos {
        merged.balance += info.balance;
        merged.unspent_outputs.extend(info.unspent_outputs);
        merged.has_unconfirmed = match (merged.has_unconfirmed, info.has_unconfirmed) {
            (Some(acc), Some(flag)) => Some(acc || flag),
            _ => None,
        };
        for tx in info.recent_transactions {
            merge_transaction(&mut merged.recent_transactions, tx);
        }
    }
    merged
}

fn merge_transaction(transactions: &mut Vec<BasicTransactionData>, tx: BasicTransactionData) {
    let existing = transactions
        .iter_mut()
        .find(|known| known.hash.eq_ignore_ascii_case(&tx.hash));
    match existing {
        Some(known) => {
            known.balance_dif += tx.balance_dif;
            known.is_confirmed = known.is_confirmed && tx.is_confirmed;
            known.date = match (known.date, tx.date) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            if known.source.is_none() {
                known.source = tx.source;
            }
            if known.destination.is_none() {
                known.destination = tx.destination;
            }
        }
        None => transactions.push(BasicTransactionData {
            hash: tx.hash.to_lowercase(),
            ..tx
        }),
    }
}
