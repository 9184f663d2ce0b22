//! Wallet events for the host application (UI refresh, toasts).

use ferry_types::{AddressHash, TxHash};

use crate::pending::PendingTransaction;

/// Events the send path and the sync handler publish on the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// The node accepted a transaction; it is now in the pending store.
    TransactionSent(PendingTransaction),
    /// A build needs the source address consolidated first.
    ConsolidationRequired { address: AddressHash },
    /// Pending entries the explorer now reports, removed from the store.
    PendingReconciled { removed: Vec<TxHash> },
    /// A user-facing message (build or submission failure).
    Notification(String),
}

/// Synchronous fan-out bus.
///
/// Listeners run inline on the emitting task, so they must not block.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&WalletEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&WalletEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &WalletEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
