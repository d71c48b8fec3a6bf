use rust_decimal::Decimal;

use std::collections::BTreeSet;

use crate::{
    primitives::{Amount, AmountType},
    wallet::{TransactionError, Wallet},
};

/// Local pre-flight checks. Every failing rule is reported, not only the first.
pub fn validate_transaction(
    wallet: &Wallet,
    amount: &Amount,
    fee: Option<&Amount>,
    dust_value: Option<Decimal>,
) -> BTreeSet<TransactionError> {
    let mut errors = BTreeSet::new();
    let coin_balance = wallet.coin_amount().value;
    let fee_value = fee.map(|fee| fee.value).unwrap_or(Decimal::ZERO);

    if amount.value <= Decimal::ZERO {
        errors.insert(TransactionError::InvalidAmountValue);
    }
    if amount.value > wallet.funds_available(&amount.amount_type) {
        errors.insert(TransactionError::AmountExceedsBalance);
    }
    if fee_value > coin_balance {
        errors.insert(TransactionError::FeeExceedsBalance);
    }

    let spends_coin = amount.amount_type == AmountType::Coin;
    let total = if spends_coin {
        amount.value + fee_value
    } else {
        fee_value
    };
    if spends_coin && total > coin_balance {
        errors.insert(TransactionError::TotalExceedsBalance);
    }

    if let Some(dust) = dust_value {
        // Zero is reported as an invalid amount, not as dust.
        if !amount.value.is_zero() && amount.value < dust {
            errors.insert(TransactionError::DustAmount);
        }
        let change = coin_balance - total;
        if change > Decimal::ZERO && change < dust {
            errors.insert(TransactionError::DustChange);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        primitives::{Blockchain, PublicKey, Token},
        wallet::Address,
    };

    fn wallet_with(balance: Decimal) -> Wallet {
        let mut wallet = Wallet::new(
            Blockchain::Dogecoin,
            PublicKey::new(vec![3; 33]),
            vec![Address::new("DMain")],
        );
        wallet.set_coin_value(balance);
        wallet
    }

    fn coin(value: Decimal) -> Amount {
        Amount::coin(Blockchain::Dogecoin, value)
    }

    #[test]
    fn zero_amount_without_dust_threshold() {
        let errors = validate_transaction(&wallet_with(dec!(1)), &coin(dec!(0)), None, None);
        assert!(errors.contains(&TransactionError::InvalidAmountValue));
        assert!(!errors.contains(&TransactionError::DustAmount));
    }

    #[test]
    fn reports_every_failing_rule() {
        let errors = validate_transaction(
            &wallet_with(dec!(1)),
            &coin(dec!(2)),
            Some(&coin(dec!(3))),
            None,
        );
        assert_eq!(
            errors,
            BTreeSet::from([
                TransactionError::AmountExceedsBalance,
                TransactionError::FeeExceedsBalance,
                TransactionError::TotalExceedsBalance,
            ])
        );
    }

    #[test]
    fn change_below_dust_is_rejected() {
        let errors = validate_transaction(
            &wallet_with(dec!(1)),
            &coin(dec!(0.5)),
            Some(&coin(dec!(0.495))),
            Some(dec!(0.01)),
        );
        assert_eq!(errors, BTreeSet::from([TransactionError::DustChange]));
    }

    #[test]
    fn change_of_exactly_zero_is_allowed() {
        let errors = validate_transaction(
            &wallet_with(dec!(1)),
            &coin(dec!(0.99)),
            Some(&coin(dec!(0.01))),
            Some(dec!(0.01)),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn amount_below_dust_is_rejected() {
        let errors = validate_transaction(
            &wallet_with(dec!(1)),
            &coin(dec!(0.001)),
            Some(&coin(dec!(0.01))),
            Some(dec!(0.01)),
        );
        assert!(errors.contains(&TransactionError::DustAmount));
    }

    #[test]
    fn zero_amount_is_not_dust() {
        let errors =
            validate_transaction(&wallet_with(dec!(1)), &coin(dec!(0)), None, Some(dec!(0.01)));
        assert_eq!(errors, BTreeSet::from([TransactionError::InvalidAmountValue]));
    }

    #[test]
    fn token_amount_below_dust_is_rejected() {
        let mut wallet = wallet_with(dec!(1));
        let token = Token::new("USDC", "0xa0b8", 6);
        wallet.set_token_value(&token, dec!(5));

        let errors = validate_transaction(
            &wallet,
            &Amount::token(&token, dec!(0.001)),
            Some(&coin(dec!(0.01))),
            Some(dec!(0.01)),
        );
        assert_eq!(errors, BTreeSet::from([TransactionError::DustAmount]));
    }

    #[test]
    fn token_spend_checks_token_balance_and_fee_separately() {
        let mut wallet = wallet_with(dec!(0.001));
        let token = Token::new("USDC", "0xa0b8", 6);
        wallet.set_token_value(&token, dec!(5));

        let errors = validate_transaction(
            &wallet,
            &Amount::token(&token, dec!(5)),
            Some(&coin(dec!(0.002))),
            None,
        );
        assert_eq!(errors, BTreeSet::from([TransactionError::FeeExceedsBalance]));
    }
}
