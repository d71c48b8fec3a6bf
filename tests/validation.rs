mod helpers;

use rust_decimal_macros::dec;

use std::{collections::BTreeSet, sync::Arc};

use chainwallet::{
    chains::bitcoin::{BitcoinChain, BitcoinNetworkProvider, BitcoinParams},
    config::ManagerConfig,
    manager::WalletManager,
    primitives::{Amount, Blockchain, PublicKey},
    wallet::{Address, TransactionError, Wallet},
};
use helpers::*;

const DOGE_ADDRESS: &str = "DDogeAddress";

async fn dogecoin_manager() -> anyhow::Result<WalletManager<BitcoinChain>> {
    let provider = StubBitcoinProvider::new("https://doge.example");
    provider.set_info(
        DOGE_ADDRESS,
        address_info(DOGE_ADDRESS, &[dec!(4), dec!(6)], vec![], Some(false)),
    );
    let params = BitcoinParams::preset(Blockchain::Dogecoin).expect("dogecoin preset");
    let chain = BitcoinChain::new(
        Blockchain::Dogecoin,
        params,
        vec![provider as Arc<dyn BitcoinNetworkProvider>],
        StubBuilder::boxed(1),
    )?;
    let wallet = Wallet::new(
        Blockchain::Dogecoin,
        PublicKey::new(vec![3; 33]),
        vec![Address::new(DOGE_ADDRESS)],
    );
    let manager = WalletManager::new(wallet, chain, ManagerConfig::default())?;
    manager.update(true).await?;
    Ok(manager)
}

fn doge(value: rust_decimal::Decimal) -> Amount {
    Amount::coin(Blockchain::Dogecoin, value)
}

#[tokio::test]
async fn zero_amount_is_invalid() -> anyhow::Result<()> {
    let provider = StubBitcoinProvider::new("https://esplora.example");
    provider.set_info(ADDRESS_A, address_info(ADDRESS_A, &[dec!(1)], vec![], None));
    let manager = bitcoin_manager(&[provider], bitcoin_wallet(&[ADDRESS_A]))?;
    manager.update(true).await?;

    let errors = manager
        .validate_transaction(&btc(dec!(0)), Some(&btc(dec!(0.0001))))
        .await;
    assert_eq!(errors, BTreeSet::from([TransactionError::InvalidAmountValue]));
    Ok(())
}

#[tokio::test]
async fn every_failing_rule_is_reported() -> anyhow::Result<()> {
    let manager = dogecoin_manager().await?;

    let errors = manager
        .validate_transaction(&doge(dec!(11)), Some(&doge(dec!(1))))
        .await;
    assert_eq!(
        errors,
        BTreeSet::from([
            TransactionError::AmountExceedsBalance,
            TransactionError::TotalExceedsBalance,
        ])
    );

    let errors = manager
        .validate_transaction(&doge(dec!(5)), Some(&doge(dec!(12))))
        .await;
    assert!(errors.contains(&TransactionError::FeeExceedsBalance));
    assert!(errors.contains(&TransactionError::TotalExceedsBalance));
    Ok(())
}

#[tokio::test]
async fn dust_limits_apply_to_amount_and_change() -> anyhow::Result<()> {
    let manager = dogecoin_manager().await?;

    let errors = manager
        .validate_transaction(&doge(dec!(0.005)), Some(&doge(dec!(1))))
        .await;
    assert_eq!(errors, BTreeSet::from([TransactionError::DustAmount]));

    let errors = manager
        .validate_transaction(&doge(dec!(8.995)), Some(&doge(dec!(1))))
        .await;
    assert_eq!(errors, BTreeSet::from([TransactionError::DustChange]));

    // Spending everything leaves no change at all.
    let errors = manager
        .validate_transaction(&doge(dec!(9)), Some(&doge(dec!(1))))
        .await;
    assert!(errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn zero_amount_is_invalid_but_not_dust() -> anyhow::Result<()> {
    let manager = dogecoin_manager().await?;

    let errors = manager
        .validate_transaction(&doge(dec!(0)), Some(&doge(dec!(1))))
        .await;
    assert_eq!(errors, BTreeSet::from([TransactionError::InvalidAmountValue]));
    Ok(())
}

#[tokio::test]
async fn valid_transaction_passes() -> anyhow::Result<()> {
    let manager = dogecoin_manager().await?;
    let errors = manager
        .validate_transaction(&doge(dec!(5)), Some(&doge(dec!(1))))
        .await;
    assert!(errors.is_empty());
    Ok(())
}
