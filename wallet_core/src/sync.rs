//! Address sync feed.
//!
//! Fetches what the explorer knows about this wallet's addresses and turns it
//! into [`SyncEvent`]s. A sync result arrives either for one address or for
//! several; [`SyncPayload`] accepts both shapes, and reconciliation always
//! works on the flattened set of hashes.

use ferry_types::{AddressHash, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SyncError;
use crate::events::{EventBus, WalletEvent};
use crate::explorer::{ExplorerClient, ExplorerTransaction};
use crate::pending::SharedPendingStore;

/// Transactions the explorer reports for one address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTransactions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<AddressHash>,
    #[serde(default)]
    pub transactions: Vec<ExplorerTransaction>,
    #[serde(default)]
    pub mempool_transactions: Vec<ExplorerTransaction>,
}

/// A sync result for one address or for many.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyncPayload {
    Many(Vec<AddressTransactions>),
    Single(AddressTransactions),
}

impl SyncPayload {
    /// Every confirmed and mempool hash in the payload.
    pub fn hashes(&self) -> HashSet<TxHash> {
        let per_address: &[AddressTransactions] = match self {
            SyncPayload::Many(all) => all,
            SyncPayload::Single(one) => std::slice::from_ref(one),
        };
        per_address
            .iter()
            .flat_map(|a| a.transactions.iter().chain(&a.mempool_transactions))
            .map(|tx| tx.hash.clone())
            .collect()
    }
}

/// Completion of one of the address sync operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// Balances, first transaction page and mempool of every address.
    AddressesDataSynced(Option<SyncPayload>),
    /// The next transaction page of a single address.
    AddressTransactionsPageSynced(Option<SyncPayload>),
    /// The next transaction page of all addresses.
    AllAddressesTransactionsPageSynced(Option<SyncPayload>),
}

impl SyncEvent {
    pub fn payload(&self) -> Option<&SyncPayload> {
        match self {
            SyncEvent::AddressesDataSynced(p)
            | SyncEvent::AddressTransactionsPageSynced(p)
            | SyncEvent::AllAddressesTransactionsPageSynced(p) => p.as_ref(),
        }
    }
}

/// Fetches address transactions from the explorer, one address at a time.
pub struct AddressSyncer {
    explorer: Arc<dyn ExplorerClient>,
    page_limit: u32,
}

impl AddressSyncer {
    pub fn new(explorer: Arc<dyn ExplorerClient>, page_limit: u32) -> Self {
        Self {
            explorer,
            page_limit,
        }
    }

    /// First confirmed page plus mempool for each address.
    pub async fn sync_addresses_data(&self, addresses: &[AddressHash]) -> Result<SyncEvent, SyncError> {
        let mut results = Vec::with_capacity(addresses.len());
        for address in addresses {
            let transactions = self
                .explorer
                .address_transactions(address, 1, self.page_limit)
                .await?;
            let mempool_transactions = self.explorer.address_mempool_transactions(address).await?;
            debug!(
                %address,
                confirmed = transactions.len(),
                mempool = mempool_transactions.len(),
                "address synced"
            );
            results.push(AddressTransactions {
                hash: Some(address.clone()),
                transactions,
                mempool_transactions,
            });
        }
        Ok(SyncEvent::AddressesDataSynced(Some(SyncPayload::Many(results))))
    }

    /// Confirmed transactions on `page` of one address.
    pub async fn sync_address_transactions_page(
        &self,
        address: &AddressHash,
        page: u32,
    ) -> Result<SyncEvent, SyncError> {
        let transactions = self
            .explorer
            .address_transactions(address, page, self.page_limit)
            .await?;
        Ok(SyncEvent::AddressTransactionsPageSynced(Some(
            SyncPayload::Single(AddressTransactions {
                hash: Some(address.clone()),
                transactions,
                mempool_transactions: Vec::new(),
            }),
        )))
    }

    /// Confirmed transactions on `page` of every address.
    pub async fn sync_all_addresses_transactions_page(
        &self,
        addresses: &[AddressHash],
        page: u32,
    ) -> Result<SyncEvent, SyncError> {
        let mut results = Vec::with_capacity(addresses.len());
        for address in addresses {
            let transactions = self
                .explorer
                .address_transactions(address, page, self.page_limit)
                .await?;
            results.push(AddressTransactions {
                hash: Some(address.clone()),
                transactions,
                mempool_transactions: Vec::new(),
            });
        }
        Ok(SyncEvent::AllAddressesTransactionsPageSynced(Some(
            SyncPayload::Many(results),
        )))
    }
}

/// Reconcile the pending store against a sync result and publish what was removed.
pub async fn reconcile_pending(
    pending: &SharedPendingStore,
    events: &EventBus,
    event: &SyncEvent,
) -> Vec<TxHash> {
    let removed = pending.write().await.apply_sync_event(event);
    if !removed.is_empty() {
        info!(removed = removed.len(), "pending transactions confirmed by explorer");
        events.emit(&WalletEvent::PendingReconciled {
            removed: removed.clone(),
        });
    }
    removed
}
