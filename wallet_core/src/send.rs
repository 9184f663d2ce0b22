//! Send orchestration: intent, build, consolidation, authentication, submission.
//!
//! The orchestrator owns one [`SendIntent`] at a time and moves through
//! [`SendState`]:
//!
//! ```text
//! Idle ──build──▶ Built ─────────────────┐
//!   │                                     ├─send──▶ (AwaitingAuth) ──▶ Sending ──▶ Idle
//!   └──build (node asks to consolidate)──▶ ConsolidationRequired ┘
//! ```
//!
//! Every method takes `&mut self`, so a single orchestrator is never driven
//! from two places at once. The pending store is the only state shared with
//! the rest of the wallet.
//!
//! Runtime failures never surface as `Err`: they come back as
//! [`BuildOutcome::Failed`] / [`SendOutcome::Failed`] and are also published
//! as [`WalletEvent::Notification`]. `Err(SendError)` means the caller broke
//! the calling contract (wrong state, missing address).

use ferry_types::{Amount, AssetId, AddressHash, Clock, SystemClock, TxHash};
use std::sync::Arc;
use tracing::{info, warn};

use crate::address::{Address, AddressRepository};
use crate::amounts::{aggregate, ensure_spendable, AssetAmounts};
use crate::auth::Authenticator;
use crate::builder::{self, BuildError};
use crate::error::SendError;
use crate::events::{EventBus, WalletEvent};
use crate::node::{NodeClient, UnsignedTxBatch};
use crate::pending::{PendingStatus, PendingTransaction, SharedPendingStore};
use crate::settings::SettingsStore;

/// Where the orchestrator currently rests.
///
/// A completed send and a failed one are reported through [`SendOutcome`];
/// the orchestrator itself goes straight back to `Idle` (success) or to the
/// built state it came from (failure).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendState {
    /// Collecting the intent. The only state in which the intent can change.
    Idle,
    /// A batch moving the intent's assets is ready.
    Built,
    /// The node asked for a consolidation; the ready batch is the sweep.
    ConsolidationRequired,
    /// Waiting for the user to confirm with PIN / biometrics.
    AwaitingAuth,
    /// Submitting the batch.
    Sending,
}

/// What the user asked to send.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendIntent {
    from: Option<AddressHash>,
    to: Option<AddressHash>,
    asset_amounts: AssetAmounts,
}

impl SendIntent {
    pub fn from_address(&self) -> Option<&AddressHash> {
        self.from.as_ref()
    }

    pub fn to_address(&self) -> Option<&AddressHash> {
        self.to.as_ref()
    }

    pub fn asset_amounts(&self) -> &AssetAmounts {
        &self.asset_amounts
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.asset_amounts.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The requested send was built as is.
    BuiltDirectly { fees: Amount },
    /// The send needs a consolidation first; the ready batch is the sweep.
    ConsolidationThenBuilt { fees: Amount },
    /// Nothing was built. The orchestrator is back in `Idle`.
    Failed(String),
}

/// Which flow a completed send finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// The user's send went out.
    AfterSend,
    /// A consolidation sweep went out; the original send still has to be made.
    AfterConsolidation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReceipt {
    /// Accepted transaction ids, in submission order.
    pub hashes: Vec<TxHash>,
    pub continuation: Continuation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Authentication is required; call `confirm_authentication` or
    /// `cancel_authentication`.
    AwaitingAuth,
    /// The user cancelled; the batch is still ready.
    AuthenticationCancelled,
    /// Every transaction was accepted. The intent has been reset.
    Sent(SendReceipt),
    /// Submission stopped. `submitted` lists what this attempt got accepted
    /// before the failure; sending again resumes after those.
    Failed { reason: String, submitted: Vec<TxHash> },
}

pub struct SendOrchestrator {
    node: Arc<dyn NodeClient>,
    addresses: Arc<dyn AddressRepository>,
    pending: SharedPendingStore,
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    events: Arc<EventBus>,

    state: SendState,
    intent: SendIntent,
    batch: Option<UnsignedTxBatch>,
    consolidation_required: bool,
    /// Ids accepted from the current batch; also the resume cursor.
    accepted: Vec<TxHash>,
}

impl SendOrchestrator {
    pub fn new(
        node: Arc<dyn NodeClient>,
        addresses: Arc<dyn AddressRepository>,
        pending: SharedPendingStore,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            node,
            addresses,
            pending,
            settings,
            clock: Arc::new(SystemClock),
            events: Arc::new(EventBus::new()),
            state: SendState::Idle,
            intent: SendIntent::default(),
            batch: None,
            consolidation_required: false,
            accepted: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    // ── Read-only views ────────────────────────────────────────────────

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn intent(&self) -> &SendIntent {
        &self.intent
    }

    /// Fees of the ready batch.
    pub fn fees(&self) -> Option<&Amount> {
        self.batch.as_ref().map(UnsignedTxBatch::fees)
    }

    pub fn consolidation_required(&self) -> bool {
        self.consolidation_required
    }

    pub fn batch(&self) -> Option<&UnsignedTxBatch> {
        self.batch.as_ref()
    }

    /// Ids from the ready batch the node already accepted.
    pub fn accepted(&self) -> &[TxHash] {
        &self.accepted
    }

    /// The shared pending list, most recent first.
    pub async fn pending_transactions(&self) -> Vec<PendingTransaction> {
        self.pending.read().await.enumerate()
    }

    // ── Intent ─────────────────────────────────────────────────────────

    pub fn set_from_address(&mut self, hash: AddressHash) -> Result<(), SendError> {
        self.ensure_intent_unlocked()?;
        self.intent.from = Some(hash);
        Ok(())
    }

    pub fn set_to_address(&mut self, hash: AddressHash) -> Result<(), SendError> {
        self.ensure_intent_unlocked()?;
        self.intent.to = Some(hash);
        Ok(())
    }

    /// Set or, with `None` / zero, remove the amount of one asset.
    pub fn set_asset_amount(&mut self, id: AssetId, amount: Option<Amount>) -> Result<(), SendError> {
        self.ensure_intent_unlocked()?;
        self.intent.asset_amounts.set(id, amount);
        Ok(())
    }

    fn ensure_intent_unlocked(&self) -> Result<(), SendError> {
        match self.state {
            SendState::Idle => Ok(()),
            state => Err(SendError::IntentLocked(state)),
        }
    }

    // ── Build ──────────────────────────────────────────────────────────

    /// Build the transactions for the current intent.
    ///
    /// When the node asks for a consolidation, the sweep is built right away
    /// and becomes the ready batch.
    pub async fn build_transaction(&mut self) -> Result<BuildOutcome, SendError> {
        if self.state != SendState::Idle {
            return Err(SendError::InvalidState {
                operation: "build",
                state: self.state,
            });
        }
        let (from, to) = self.resolve_intent_addresses().await?;
        let assets = self.intent.asset_amounts.as_slice().to_vec();

        if let Err(underflow) = ensure_spendable(&from, &assets) {
            return Ok(self.build_failed(format!("insufficient funds: {underflow}")));
        }

        match builder::build(self.node.as_ref(), &from, &to, &assets).await {
            Ok(batch) => {
                let fees = batch.fees().clone();
                self.ready(batch, false);
                Ok(BuildOutcome::BuiltDirectly { fees })
            }
            Err(BuildError::ConsolidationRequired) => {
                info!(from = %from.hash, "node requires consolidation, building sweep");
                self.consolidation_required = true;
                self.state = SendState::ConsolidationRequired;
                self.events.emit(&WalletEvent::ConsolidationRequired {
                    address: from.hash.clone(),
                });

                match builder::build_sweep(self.node.as_ref(), &from).await {
                    Ok(batch) => {
                        let fees = batch.fees().clone();
                        self.ready(batch, true);
                        Ok(BuildOutcome::ConsolidationThenBuilt { fees })
                    }
                    Err(err) => Ok(self.build_failed(err.to_string())),
                }
            }
            Err(err) => Ok(self.build_failed(err.to_string())),
        }
    }

    fn ready(&mut self, batch: UnsignedTxBatch, consolidation: bool) {
        self.batch = Some(batch);
        self.accepted.clear();
        self.consolidation_required = consolidation;
        self.state = if consolidation {
            SendState::ConsolidationRequired
        } else {
            SendState::Built
        };
    }

    fn build_failed(&mut self, reason: String) -> BuildOutcome {
        warn!(%reason, "build failed");
        self.batch = None;
        self.accepted.clear();
        self.consolidation_required = false;
        self.state = SendState::Idle;
        self.events.emit(&WalletEvent::Notification(reason.clone()));
        BuildOutcome::Failed(reason)
    }

    // ── Send ───────────────────────────────────────────────────────────

    /// Start sending the ready batch.
    ///
    /// With authentication required this only moves to `AwaitingAuth`; the
    /// host then prompts the user and calls [`Self::confirm_authentication`]
    /// or [`Self::cancel_authentication`].
    pub async fn send_transaction(&mut self) -> Result<SendOutcome, SendError> {
        self.ensure_built("send")?;
        if self.settings.require_auth() {
            self.state = SendState::AwaitingAuth;
            return Ok(SendOutcome::AwaitingAuth);
        }
        self.submit().await
    }

    pub async fn confirm_authentication(&mut self) -> Result<SendOutcome, SendError> {
        if self.state != SendState::AwaitingAuth {
            return Err(SendError::InvalidState {
                operation: "confirm authentication",
                state: self.state,
            });
        }
        self.submit().await
    }

    pub fn cancel_authentication(&mut self) -> Result<SendOutcome, SendError> {
        if self.state != SendState::AwaitingAuth {
            return Err(SendError::InvalidState {
                operation: "cancel authentication",
                state: self.state,
            });
        }
        self.state = self.built_state();
        info!("authentication cancelled");
        Ok(SendOutcome::AuthenticationCancelled)
    }

    /// Send, prompting through `authenticator` when authentication is required.
    ///
    /// Fails closed: if authentication is required but no method is
    /// available on this device, nothing is submitted.
    pub async fn send_with_authenticator(
        &mut self,
        authenticator: &dyn Authenticator,
    ) -> Result<SendOutcome, SendError> {
        self.ensure_built("send")?;
        if !self.settings.require_auth() {
            return self.submit().await;
        }
        if !authenticator.is_available() {
            let reason = "authentication is required but not available".to_string();
            warn!(%reason, "send refused");
            self.events.emit(&WalletEvent::Notification(reason.clone()));
            return Ok(SendOutcome::Failed {
                reason,
                submitted: Vec::new(),
            });
        }

        self.state = SendState::AwaitingAuth;
        if authenticator.confirm().await {
            self.confirm_authentication().await
        } else {
            self.cancel_authentication()
        }
    }

    fn ensure_built(&self, operation: &'static str) -> Result<(), SendError> {
        match self.state {
            SendState::Built | SendState::ConsolidationRequired if self.batch.is_some() => Ok(()),
            state => Err(SendError::InvalidState { operation, state }),
        }
    }

    fn built_state(&self) -> SendState {
        if self.consolidation_required {
            SendState::ConsolidationRequired
        } else {
            SendState::Built
        }
    }

    /// Submit the remaining entries of the batch, strictly in order.
    async fn submit(&mut self) -> Result<SendOutcome, SendError> {
        let resume_state = self.built_state();
        let (from, to) = match self.resolve_intent_addresses().await {
            Ok(resolved) => resolved,
            Err(err) => {
                self.state = resume_state;
                return Err(err);
            }
        };
        let Some(batch) = self.batch.clone() else {
            self.state = resume_state;
            return Err(SendError::InvalidState {
                operation: "send",
                state: self.state,
            });
        };

        // A sweep moves funds back into the source address.
        let to_address = if self.consolidation_required {
            from.hash.clone()
        } else {
            to
        };
        let totals = aggregate(self.intent.asset_amounts.as_slice());

        self.state = SendState::Sending;
        let mut submitted = Vec::new();

        for entry in batch.unsigned_txs().iter().skip(self.accepted.len()) {
            let hash = match self
                .node
                .sign_and_send_transaction(&from, &entry.tx_id, &entry.unsigned_tx)
                .await
            {
                Ok(hash) => hash,
                Err(err) => {
                    let reason = err.to_string();
                    warn!(
                        tx_id = %entry.tx_id,
                        %reason,
                        accepted = self.accepted.len(),
                        remaining = batch.len() - self.accepted.len(),
                        "submission failed, halting batch"
                    );
                    self.state = resume_state;
                    self.events.emit(&WalletEvent::Notification(reason.clone()));
                    return Ok(SendOutcome::Failed { reason, submitted });
                }
            };

            let tx = PendingTransaction {
                hash: hash.clone(),
                from_address: from.hash.clone(),
                to_address: to_address.clone(),
                amount: totals.native_amount.clone(),
                tokens: totals.token_amounts.clone(),
                timestamp: self.clock.now(),
                status: PendingStatus::Pending,
            };
            self.pending.write().await.insert(tx.clone());
            self.accepted.push(hash.clone());
            submitted.push(hash);

            self.addresses.transaction_sent(&tx).await;
            info!(hash = %tx.hash, from = %tx.from_address, to = %tx.to_address, "transaction sent");
            self.events.emit(&WalletEvent::TransactionSent(tx));
        }

        let receipt = SendReceipt {
            hashes: std::mem::take(&mut self.accepted),
            continuation: if self.consolidation_required {
                Continuation::AfterConsolidation
            } else {
                Continuation::AfterSend
            },
        };
        self.reset();
        Ok(SendOutcome::Sent(receipt))
    }

    async fn resolve_intent_addresses(&self) -> Result<(Address, AddressHash), SendError> {
        let from_hash = self.intent.from.as_ref().ok_or(SendError::MissingFromAddress)?;
        let to = self.intent.to.clone().ok_or(SendError::MissingToAddress)?;
        let from = self
            .addresses
            .address(from_hash)
            .await
            .ok_or_else(|| SendError::UnknownAddress(from_hash.clone()))?;
        Ok((from, to))
    }

    // ── Reset ──────────────────────────────────────────────────────────

    /// Drop the ready batch and go back to editing the same intent.
    pub fn discard_batch(&mut self) -> Result<(), SendError> {
        self.ensure_built("discard batch")?;
        self.batch = None;
        self.accepted.clear();
        self.consolidation_required = false;
        self.state = SendState::Idle;
        Ok(())
    }

    /// Forget everything about the current send, from any state.
    ///
    /// Entries already in the pending store stay there.
    pub fn abandon(&mut self) {
        if self.state != SendState::Idle || !self.intent.is_empty() {
            info!(state = ?self.state, "send abandoned");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SendState::Idle;
        self.intent = SendIntent::default();
        self.batch = None;
        self.consolidation_required = false;
        self.accepted.clear();
    }
}
