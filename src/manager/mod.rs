mod builder;
mod chain;
pub mod error;
mod validation;

use chrono::Utc;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::instrument;

use std::{collections::BTreeSet, future::Future};

pub use builder::*;
pub use chain::*;
pub use error::WalletManagerError;
pub use validation::validate_transaction;

use crate::{
    config::{ConfigError, ManagerConfig},
    debounce::{Debouncer, Invocation},
    error::DomainError,
    primitives::{Amount, Token, TransactionStatus},
    signer::{SignerError, TransactionSigner},
    wallet::{Fee, TransactionData, TransactionError, TransactionFee, Wallet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Updating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    Building,
    Signing,
    Broadcasting,
}

/// Owns one wallet and drives its refresh and send lifecycles against a chain.
///
/// Updates and sends may overlap with each other, but never with themselves: updates are
/// serialized by the debouncer, sends by `send_lock`. The wallet is only written after the
/// network work of an operation has fully succeeded.
pub struct WalletManager<C: WalletChain> {
    chain: C,
    wallet: RwLock<Wallet>,
    debouncer: Debouncer,
    send_lock: Mutex<()>,
    shutdown: watch::Sender<bool>,
    update_phase: watch::Sender<UpdatePhase>,
    send_phase: watch::Sender<SendPhase>,
}

impl<C: WalletChain> WalletManager<C> {
    pub fn new(wallet: Wallet, chain: C, config: ManagerConfig) -> Result<Self, ConfigError> {
        if wallet.blockchain != chain.blockchain() {
            return Err(ConfigError::BlockchainMismatch {
                wallet: wallet.id,
                wallet_chain: wallet.blockchain,
                chain: chain.blockchain(),
            });
        }
        Ok(Self {
            chain,
            wallet: RwLock::new(wallet),
            debouncer: Debouncer::new(config.debounce_window),
            send_lock: Mutex::new(()),
            shutdown: watch::channel(false).0,
            update_phase: watch::channel(UpdatePhase::Idle).0,
            send_phase: watch::channel(SendPhase::Idle).0,
        })
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// A copy of the current wallet state.
    pub async fn wallet(&self) -> Wallet {
        self.wallet.read().await.clone()
    }

    pub fn current_host(&self) -> String {
        self.chain.current_host()
    }

    pub fn update_phase(&self) -> watch::Receiver<UpdatePhase> {
        self.update_phase.subscribe()
    }

    pub fn send_phase(&self) -> watch::Receiver<SendPhase> {
        self.send_phase.subscribe()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::TransactionSender => true,
            Capability::SignatureCountValidator => self.chain.signature_count_validator().is_some(),
            Capability::TokenFinder => self.chain.token_finder().is_some(),
        }
    }

    /// Cancels in-flight operations. Every later call fails with `Cancelled`.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    #[instrument(
        name = "wallet_manager.update",
        skip(self),
        fields(blockchain = %self.chain.blockchain(), host),
        err
    )]
    pub async fn update(&self, force_update: bool) -> Result<Invocation, WalletManagerError> {
        self.ensure_running()?;
        let invocation = self
            .debouncer
            .invoke_on_expire(force_update, || async {
                let _phase = PhaseGuard::enter(&self.update_phase, UpdatePhase::Updating);
                let snapshot = self.wallet().await;
                let update = self
                    .cancellable(async { Ok(self.chain.fetch_update(&snapshot).await?) })
                    .await?;
                let mut wallet = self.wallet.write().await;
                self.chain.commit(&mut wallet, update);
                Ok::<_, WalletManagerError>(())
            })
            .await?;
        tracing::Span::current().record("host", self.chain.current_host().as_str());
        Ok(invocation)
    }

    /// Builds, signs and broadcasts `transaction`, returning it with its network hash.
    ///
    /// A signing failure never reaches the network. The hash is only assigned and the
    /// transaction only recorded once the broadcast succeeded.
    #[instrument(
        name = "wallet_manager.send",
        skip_all,
        fields(
            blockchain = %self.chain.blockchain(),
            destination = %transaction.destination_address,
            n_signatures,
            hash
        ),
        err
    )]
    pub async fn send(
        &self,
        transaction: TransactionData,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionData, WalletManagerError> {
        self.ensure_running()?;
        let _sending = self.send_lock.lock().await;
        let snapshot = self.wallet().await;
        let builder = self.chain.transaction_builder();

        let phase = PhaseGuard::enter(&self.send_phase, SendPhase::Building);
        let hashes = builder.build_for_sign(&transaction, &snapshot)?;
        if hashes.is_empty() {
            return Err(BuildError::NothingToSign.into());
        }
        tracing::Span::current().record("n_signatures", hashes.len());

        phase.set(SendPhase::Signing);
        let signatures = self
            .cancellable(async {
                let signatures = match hashes.as_slice() {
                    [hash] => vec![signer.sign(hash, &snapshot.public_key).await?],
                    _ => signer.sign_batch(&hashes, &snapshot.public_key).await?,
                };
                Ok(signatures)
            })
            .await?;
        if signatures.len() != hashes.len() {
            return Err(SignerError::UnexpectedSignatureCount {
                expected: hashes.len(),
                actual: signatures.len(),
            }
            .into());
        }

        phase.set(SendPhase::Broadcasting);
        let signed = builder.build_for_send(&transaction, &snapshot, &signatures)?;
        let hash = self
            .cancellable(async { Ok(self.chain.broadcast(&signed).await?) })
            .await?;
        tracing::Span::current().record("hash", hash.as_str());

        let mut sent = transaction;
        sent.hash = Some(hash.to_lowercase());
        self.wallet
            .write()
            .await
            .add_outgoing_transaction(sent.clone());
        Ok(sent)
    }

    #[instrument(name = "wallet_manager.get_fee", skip(self), fields(blockchain = %self.chain.blockchain()), err)]
    pub async fn get_fee(
        &self,
        amount: &Amount,
        destination: &str,
    ) -> Result<TransactionFee, WalletManagerError> {
        self.ensure_running()?;
        let snapshot = self.wallet().await;
        self.cancellable(self.chain.fee(&snapshot, amount, destination))
            .await
    }

    pub async fn validate_transaction(
        &self,
        amount: &Amount,
        fee: Option<&Amount>,
    ) -> BTreeSet<TransactionError> {
        let wallet = self.wallet.read().await;
        validate_transaction(&wallet, amount, fee, self.chain.dust_value())
    }

    /// A fresh, unsent transaction from the wallet's primary address.
    pub async fn create_transaction(
        &self,
        amount: Amount,
        fee: Option<Fee>,
        destination: impl Into<String>,
    ) -> TransactionData {
        let wallet = self.wallet.read().await;
        TransactionData {
            contract_address: amount
                .amount_type
                .token()
                .map(|token| token.contract_address.clone()),
            amount,
            fee,
            source_address: wallet.address().to_string(),
            destination_address: destination.into(),
            status: TransactionStatus::Unconfirmed,
            hash: None,
            date: Utc::now(),
        }
    }

    #[instrument(name = "wallet_manager.validate_signature_count", skip(self), err)]
    pub async fn validate_signature_count(
        &self,
        signed_hashes: u64,
    ) -> Result<(), WalletManagerError> {
        self.ensure_running()?;
        let validator = self.chain.signature_count_validator().ok_or(
            WalletManagerError::CapabilityNotSupported(Capability::SignatureCountValidator),
        )?;
        let snapshot = self.wallet().await;
        let on_chain = self
            .cancellable(async { Ok(validator.signature_count(&snapshot).await?) })
            .await?;
        if on_chain != signed_hashes {
            return Err(DomainError::SignatureCountMismatch {
                expected: signed_hashes,
                actual: on_chain,
            }
            .into());
        }
        Ok(())
    }

    /// Discovers tokens held by the wallet and starts tracking them with their balances.
    #[instrument(name = "wallet_manager.find_tokens", skip(self), err)]
    pub async fn find_tokens(&self) -> Result<Vec<Token>, WalletManagerError> {
        self.ensure_running()?;
        let finder = self
            .chain
            .token_finder()
            .ok_or(WalletManagerError::CapabilityNotSupported(Capability::TokenFinder))?;
        let snapshot = self.wallet().await;
        let found = self
            .cancellable(async { Ok(finder.find_tokens(&snapshot).await?) })
            .await?;

        let mut wallet = self.wallet.write().await;
        let mut tokens = Vec::new();
        for amount in found {
            if let Some(token) = amount.amount_type.token() {
                wallet.set_token_value(token, amount.value);
                tokens.push(token.clone());
            }
        }
        Ok(tokens)
    }

    pub async fn add_token(&self, token: Token) {
        self.wallet.write().await.add_token(token);
    }

    pub async fn remove_token(&self, token: &Token) {
        self.wallet.write().await.remove_token(token);
    }

    fn ensure_running(&self) -> Result<(), WalletManagerError> {
        if self.is_shut_down() {
            return Err(WalletManagerError::Cancelled);
        }
        Ok(())
    }

    async fn cancellable<T>(
        &self,
        operation: impl Future<Output = Result<T, WalletManagerError>>,
    ) -> Result<T, WalletManagerError> {
        let mut shutdown = self.shutdown.subscribe();
        tokio::select! {
            result = operation => result,
            _ = shutdown.wait_for(|shut_down| *shut_down) => Err(WalletManagerError::Cancelled),
        }
    }
}

/// Publishes a phase and falls back to idle when dropped, including on early returns.
struct PhaseGuard<'a, P: Copy + Idle> {
    sender: &'a watch::Sender<P>,
}

impl<'a, P: Copy + Idle> PhaseGuard<'a, P> {
    fn enter(sender: &'a watch::Sender<P>, phase: P) -> Self {
        sender.send_replace(phase);
        Self { sender }
    }

    fn set(&self, phase: P) {
        self.sender.send_replace(phase);
    }
}

impl<P: Copy + Idle> Drop for PhaseGuard<'_, P> {
    fn drop(&mut self) {
        self.sender.send_replace(P::IDLE);
    }
}

trait Idle {
    const IDLE: Self;
}

impl Idle for UpdatePhase {
    const IDLE: Self = UpdatePhase::Idle;
}

impl Idle for SendPhase {
    const IDLE: Self = SendPhase::Idle;
}
