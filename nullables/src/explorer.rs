//! Nullable explorer: in-memory address transaction listings.

use async_trait::async_trait;
use ferry_types::AddressHash;
use ferry_wallet_core::{ExplorerClient, ExplorerTransaction, SyncError};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::lock;

/// An explorer serving whatever the test put into it.
#[derive(Default)]
pub struct NullExplorer {
    confirmed: Mutex<HashMap<AddressHash, Vec<ExplorerTransaction>>>,
    mempool: Mutex<HashMap<AddressHash, Vec<ExplorerTransaction>>>,
    failure_status: Mutex<Option<u16>>,
    requests: Mutex<Vec<(AddressHash, Option<u32>)>>,
}

impl NullExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmed transactions of `address`, newest first.
    pub fn set_confirmed(&self, address: &AddressHash, hashes: &[&str]) {
        lock(&self.confirmed).insert(address.clone(), listing(hashes));
    }

    pub fn set_mempool(&self, address: &AddressHash, hashes: &[&str]) {
        lock(&self.mempool).insert(address.clone(), listing(hashes));
    }

    /// Make every following request fail with HTTP `status`; `None` heals it.
    pub fn fail_with(&self, status: Option<u16>) {
        *lock(&self.failure_status) = status;
    }

    /// `(address, page)` of every request; mempool requests have no page.
    pub fn requests(&self) -> Vec<(AddressHash, Option<u32>)> {
        lock(&self.requests).clone()
    }

    fn check(&self) -> Result<(), SyncError> {
        match *lock(&self.failure_status) {
            Some(status) => Err(SyncError::Status { status }),
            None => Ok(()),
        }
    }
}

fn listing(hashes: &[&str]) -> Vec<ExplorerTransaction> {
    hashes.iter().map(|h| ExplorerTransaction::new(*h)).collect()
}

#[async_trait]
impl ExplorerClient for NullExplorer {
    async fn address_transactions(
        &self,
        address: &AddressHash,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ExplorerTransaction>, SyncError> {
        lock(&self.requests).push((address.clone(), Some(page)));
        self.check()?;
        let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        Ok(lock(&self.confirmed)
            .get(address)
            .map(|all| all.iter().skip(skip).take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn address_mempool_transactions(
        &self,
        address: &AddressHash,
    ) -> Result<Vec<ExplorerTransaction>, SyncError> {
        lock(&self.requests).push((address.clone(), None));
        self.check()?;
        Ok(lock(&self.mempool).get(address).cloned().unwrap_or_default())
    }
}
