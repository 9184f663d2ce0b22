//! Nullable address repository.

use async_trait::async_trait;
use ferry_types::AddressHash;
use ferry_wallet_core::{Address, AddressRepository, PendingTransaction};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::lock;

/// A fixed set of addresses that records every reported transaction
/// instead of applying it.
#[derive(Default)]
pub struct NullAddressRepository {
    addresses: Mutex<HashMap<AddressHash, Address>>,
    sent: Mutex<Vec<PendingTransaction>>,
}

impl NullAddressRepository {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            addresses: Mutex::new(addresses.into_iter().map(|a| (a.hash.clone(), a)).collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn remove(&self, hash: &AddressHash) {
        lock(&self.addresses).remove(hash);
    }

    /// Transactions reported through `transaction_sent`, in order.
    pub fn sent(&self) -> Vec<PendingTransaction> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl AddressRepository for NullAddressRepository {
    async fn address(&self, hash: &AddressHash) -> Option<Address> {
        lock(&self.addresses).get(hash).cloned()
    }

    async fn transaction_sent(&self, tx: &PendingTransaction) {
        lock(&self.sent).push(tx.clone());
    }
}
