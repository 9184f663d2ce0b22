//! Wallet addresses and the repository the send path reads them from.

use async_trait::async_trait;
use ferry_types::{Amount, AssetId, AddressHash, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::pending::PendingTransaction;

/// Balance of one token held by an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub id: AssetId,
    pub balance: Amount,
    #[serde(default)]
    pub locked_balance: Amount,
}

/// A wallet address with its last known balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub hash: AddressHash,
    /// Hex-encoded public key; the node builds transactions from it.
    pub public_key: String,
    #[serde(default)]
    pub balance: Amount,
    #[serde(default)]
    pub locked_balance: Amount,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
    /// Known transaction hashes, most recent first.
    #[serde(default)]
    pub transactions: Vec<TxHash>,
}

impl Address {
    pub fn new(hash: AddressHash, public_key: impl Into<String>) -> Self {
        Self {
            hash,
            public_key: public_key.into(),
            balance: Amount::zero(),
            locked_balance: Amount::zero(),
            tokens: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn with_balance(mut self, balance: impl Into<Amount>) -> Self {
        self.balance = balance.into();
        self
    }

    pub fn token_balance(&self, id: &AssetId) -> Option<&TokenBalance> {
        self.tokens.iter().find(|t| &t.id == id)
    }
}

/// Source of address data for the send path.
///
/// The send path only reads addresses and reports submitted transactions;
/// balances are refreshed by whoever owns the repository.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn address(&self, hash: &AddressHash) -> Option<Address>;

    /// A transaction from one of this wallet's addresses was accepted by the node.
    async fn transaction_sent(&self, tx: &PendingTransaction);
}

/// In-memory address repository.
#[derive(Default)]
pub struct AddressBook {
    addresses: RwLock<HashMap<AddressHash, Address>>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, address: Address) {
        self.addresses
            .write()
            .await
            .insert(address.hash.clone(), address);
    }

    pub async fn remove(&self, hash: &AddressHash) -> Option<Address> {
        self.addresses.write().await.remove(hash)
    }

    /// All address hashes, sorted.
    pub async fn hashes(&self) -> Vec<AddressHash> {
        let mut hashes: Vec<_> = self.addresses.read().await.keys().cloned().collect();
        hashes.sort();
        hashes
    }

    pub async fn clear(&self) {
        self.addresses.write().await.clear();
    }
}

#[async_trait]
impl AddressRepository for AddressBook {
    async fn address(&self, hash: &AddressHash) -> Option<Address> {
        self.addresses.read().await.get(hash).cloned()
    }

    async fn transaction_sent(&self, tx: &PendingTransaction) {
        let mut addresses = self.addresses.write().await;
        for hash in [&tx.from_address, &tx.to_address] {
            if let Some(address) = addresses.get_mut(hash) {
                if !address.transactions.contains(&tx.hash) {
                    address.transactions.insert(0, tx.hash.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::PendingStatus;
    use ferry_types::Timestamp;

    fn hash(s: &str) -> AddressHash {
        AddressHash::parse(s).unwrap()
    }

    fn sent(tx: &str, from: &str, to: &str) -> PendingTransaction {
        PendingTransaction {
            hash: TxHash::new(tx),
            from_address: hash(from),
            to_address: hash(to),
            amount: Amount::from(1u64),
            tokens: Vec::new(),
            timestamp: Timestamp::from_millis(1),
            status: PendingStatus::Pending,
        }
    }

    #[tokio::test]
    async fn upsert_and_lookup() {
        let book = AddressBook::new();
        book.upsert(Address::new(hash("addr1"), "pk1").with_balance(100u64))
            .await;
        let found = book.address(&hash("addr1")).await.unwrap();
        assert_eq!(found.balance, Amount::from(100u64));
        assert!(book.address(&hash("addr2")).await.is_none());
    }

    #[tokio::test]
    async fn transaction_sent_records_on_both_own_addresses() {
        let book = AddressBook::new();
        book.upsert(Address::new(hash("addr1"), "pk1")).await;
        book.upsert(Address::new(hash("addr2"), "pk2")).await;

        book.transaction_sent(&sent("tx1", "addr1", "addr2")).await;
        book.transaction_sent(&sent("tx2", "addr1", "externa1")).await;

        let a1 = book.address(&hash("addr1")).await.unwrap();
        let a2 = book.address(&hash("addr2")).await.unwrap();
        assert_eq!(a1.transactions, vec![TxHash::new("tx2"), TxHash::new("tx1")]);
        assert_eq!(a2.transactions, vec![TxHash::new("tx1")]);
    }

    #[tokio::test]
    async fn transaction_sent_is_idempotent() {
        let book = AddressBook::new();
        book.upsert(Address::new(hash("addr1"), "pk1")).await;
        let tx = sent("tx1", "addr1", "addr1");
        book.transaction_sent(&tx).await;
        book.transaction_sent(&tx).await;
        assert_eq!(book.address(&hash("addr1")).await.unwrap().transactions.len(), 1);
    }

    #[tokio::test]
    async fn hashes_are_sorted() {
        let book = AddressBook::new();
        book.upsert(Address::new(hash("addr2"), "pk2")).await;
        book.upsert(Address::new(hash("addr1"), "pk1")).await;
        assert_eq!(book.hashes().await, vec![hash("addr1"), hash("addr2")]);
    }
}
