//! Pending transaction store.
//!
//! Holds the transactions this wallet submitted that the explorer has not
//! reported back yet. Entries are created only after the node accepted a
//! submission, and leave the store only through [`PendingTransactionStore::reconcile`]
//! (the explorer now lists the hash, confirmed or in mempool) or a full
//! [`PendingTransactionStore::reset`]. There is no expiry.

use ferry_types::{Amount, AssetAmount, AddressHash, Timestamp, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::sync::SyncEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    Pending,
}

/// A submitted, not yet confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub from_address: AddressHash,
    pub to_address: AddressHash,
    /// Native amount of the whole send this transaction belongs to.
    pub amount: Amount,
    pub tokens: Vec<AssetAmount>,
    pub timestamp: Timestamp,
    pub status: PendingStatus,
}

/// Pending transactions keyed by hash.
///
/// Storage is unordered; every listing is sorted most recent first.
#[derive(Debug, Default)]
pub struct PendingTransactionStore {
    entries: HashMap<TxHash, PendingTransaction>,
}

/// The store as shared between the send path and the sync handler.
pub type SharedPendingStore = Arc<RwLock<PendingTransactionStore>>;

impl PendingTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPendingStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert or replace by hash. Returns the replaced entry, if any.
    pub fn insert(&mut self, tx: PendingTransaction) -> Option<PendingTransaction> {
        self.entries.insert(tx.hash.clone(), tx)
    }

    pub fn get(&self, hash: &TxHash) -> Option<&PendingTransaction> {
        self.entries.get(hash)
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, most recent first. Equal timestamps are ordered by hash.
    pub fn enumerate(&self) -> Vec<PendingTransaction> {
        let mut all: Vec<_> = self.entries.values().cloned().collect();
        sort_most_recent_first(&mut all);
        all
    }

    /// Entries sent from or to any of `addresses`, most recent first.
    pub fn pending_for_addresses(&self, addresses: &[AddressHash]) -> Vec<PendingTransaction> {
        let mut selected: Vec<_> = self
            .entries
            .values()
            .filter(|tx| addresses.contains(&tx.from_address) || addresses.contains(&tx.to_address))
            .cloned()
            .collect();
        sort_most_recent_first(&mut selected);
        selected
    }

    /// Remove every entry whose hash is in `seen`. Returns the removed hashes, sorted.
    pub fn reconcile(&mut self, seen: &HashSet<TxHash>) -> Vec<TxHash> {
        let mut removed: Vec<TxHash> = seen
            .iter()
            .filter(|hash| self.entries.remove(*hash).is_some())
            .cloned()
            .collect();
        removed.sort();
        if !removed.is_empty() {
            debug!(removed = removed.len(), remaining = self.entries.len(), "pending transactions reconciled");
        }
        removed
    }

    /// Reconcile against the result of an address sync.
    pub fn apply_sync_event(&mut self, event: &SyncEvent) -> Vec<TxHash> {
        match event.payload() {
            Some(payload) => self.reconcile(&payload.hashes()),
            None => Vec::new(),
        }
    }

    /// Drop everything (wallet deleted or app reset).
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

fn sort_most_recent_first(txs: &mut [PendingTransaction]) {
    txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.hash.cmp(&b.hash)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{AddressTransactions, SyncPayload};
    use crate::explorer::ExplorerTransaction;

    fn addr(s: &str) -> AddressHash {
        AddressHash::parse(s).unwrap()
    }

    fn pending(hash: &str, timestamp: u64) -> PendingTransaction {
        pending_between(hash, timestamp, "addr1", "addr2")
    }

    fn pending_between(hash: &str, timestamp: u64, from: &str, to: &str) -> PendingTransaction {
        PendingTransaction {
            hash: TxHash::new(hash),
            from_address: addr(from),
            to_address: addr(to),
            amount: Amount::from(10u64),
            tokens: Vec::new(),
            timestamp: Timestamp::from_millis(timestamp),
            status: PendingStatus::Pending,
        }
    }

    fn hashes(txs: &[PendingTransaction]) -> Vec<&str> {
        txs.iter().map(|tx| tx.hash.as_str()).collect()
    }

    fn seen(hashes: &[&str]) -> HashSet<TxHash> {
        hashes.iter().map(|h| TxHash::new(*h)).collect()
    }

    #[test]
    fn enumerate_is_most_recent_first() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("A", 100));
        store.insert(pending("C", 300));
        store.insert(pending("B", 200));
        assert_eq!(hashes(&store.enumerate()), vec!["C", "B", "A"]);
    }

    #[test]
    fn insert_same_hash_replaces() {
        let mut store = PendingTransactionStore::new();
        assert!(store.insert(pending("A", 100)).is_none());
        let replaced = store.insert(pending("A", 500));
        assert_eq!(replaced.unwrap().timestamp, Timestamp::from_millis(100));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&TxHash::new("A")).unwrap().timestamp,
            Timestamp::from_millis(500)
        );
    }

    #[test]
    fn reconcile_removes_only_seen_hashes() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("A", 300));
        store.insert(pending("B", 200));
        store.insert(pending("C", 100));

        let removed = store.reconcile(&seen(&["B"]));

        assert_eq!(removed, vec![TxHash::new("B")]);
        assert_eq!(hashes(&store.enumerate()), vec!["A", "C"]);
    }

    #[test]
    fn reconcile_order_depends_only_on_timestamp() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("C", 100));
        store.insert(pending("A", 300));
        store.insert(pending("B", 200));
        store.reconcile(&seen(&["B"]));
        assert_eq!(hashes(&store.enumerate()), vec!["A", "C"]);
    }

    #[test]
    fn reconcile_ignores_unknown_hashes() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("A", 1));
        assert!(store.reconcile(&seen(&["X", "Y"])).is_empty());
        assert!(store.reconcile(&HashSet::new()).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn equal_timestamps_are_ordered_by_hash() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("B", 100));
        store.insert(pending("A", 100));
        assert_eq!(hashes(&store.enumerate()), vec!["A", "B"]);
    }

    #[test]
    fn pending_for_addresses_matches_either_side() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending_between("A", 1, "addr1", "addr2"));
        store.insert(pending_between("B", 2, "addr3", "addr1"));
        store.insert(pending_between("C", 3, "addr3", "addr4"));

        let selected = store.pending_for_addresses(&[addr("addr1")]);
        assert_eq!(hashes(&selected), vec!["B", "A"]);
        assert!(store.pending_for_addresses(&[addr("addr9")]).is_empty());
    }

    #[test]
    fn apply_sync_event_single_and_many_shapes_agree() {
        let payload = AddressTransactions {
            hash: None,
            transactions: vec![ExplorerTransaction::new("B")],
            mempool_transactions: Vec::new(),
        };

        let mut single = PendingTransactionStore::new();
        let mut many = PendingTransactionStore::new();
        for store in [&mut single, &mut many] {
            store.insert(pending("A", 1));
            store.insert(pending("B", 2));
        }

        single.apply_sync_event(&SyncEvent::AddressTransactionsPageSynced(Some(
            SyncPayload::Single(payload.clone()),
        )));
        many.apply_sync_event(&SyncEvent::AllAddressesTransactionsPageSynced(Some(
            SyncPayload::Many(vec![payload]),
        )));

        assert_eq!(single.enumerate(), many.enumerate());
        assert_eq!(hashes(&single.enumerate()), vec!["A"]);
    }

    #[test]
    fn apply_sync_event_without_payload_is_noop() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("A", 1));
        assert!(store
            .apply_sync_event(&SyncEvent::AddressesDataSynced(None))
            .is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = PendingTransactionStore::new();
        store.insert(pending("A", 1));
        store.insert(pending("B", 2));
        store.reset();
        assert!(store.is_empty());
    }

    #[test]
    fn serializes_in_api_shape() {
        let json = serde_json::to_value(pending("A", 42)).unwrap();
        assert_eq!(json["hash"], "A");
        assert_eq!(json["fromAddress"], "addr1");
        assert_eq!(json["toAddress"], "addr2");
        assert_eq!(json["amount"], "10");
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["status"], "pending");
    }
}
