//! Explorer (ledger-index) client.
//!
//! Only transaction hashes are read from the explorer; they are what the
//! pending store reconciles against.

use async_trait::async_trait;
use ferry_types::{AddressHash, TxHash};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::WalletConfig;
use crate::error::SyncError;

/// A transaction as listed by the explorer, confirmed or in mempool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerTransaction {
    pub hash: TxHash,
}

impl ExplorerTransaction {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: TxHash::new(hash),
        }
    }
}

#[async_trait]
pub trait ExplorerClient: Send + Sync {
    /// Confirmed transactions of `address`, newest first. Pages start at 1.
    async fn address_transactions(
        &self,
        address: &AddressHash,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ExplorerTransaction>, SyncError>;

    /// Transactions of `address` currently in the mempool.
    async fn address_mempool_transactions(
        &self,
        address: &AddressHash,
    ) -> Result<Vec<ExplorerTransaction>, SyncError>;
}

/// HTTP client for the explorer REST API.
#[derive(Clone)]
pub struct HttpExplorerClient {
    http: reqwest::Client,
    explorer_url: String,
}

impl HttpExplorerClient {
    pub fn new(explorer_url: impl Into<String>, timeout: Duration, connect_timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| SyncError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            explorer_url: explorer_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, SyncError> {
        Self::new(
            config.explorer_api_host.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R, SyncError> {
        let url = format!("{}{}", self.explorer_url, path);
        debug!(%url, "explorer request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ExplorerClient for HttpExplorerClient {
    async fn address_transactions(
        &self,
        address: &AddressHash,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ExplorerTransaction>, SyncError> {
        self.get_json(
            &format!("/addresses/{address}/transactions"),
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn address_mempool_transactions(
        &self,
        address: &AddressHash,
    ) -> Result<Vec<ExplorerTransaction>, SyncError> {
        self.get_json(&format!("/addresses/{address}/mempool/transactions"), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_explorer_listing_ignoring_extra_fields() {
        let body = r#"[
            {"hash": "aa11", "blockHash": "ff", "timestamp": 1700000000000, "inputs": [], "outputs": []},
            {"hash": "bb22", "lastSeen": 1700000000001}
        ]"#;
        let txs: Vec<ExplorerTransaction> = serde_json::from_str(body).unwrap();
        assert_eq!(txs, vec![ExplorerTransaction::new("aa11"), ExplorerTransaction::new("bb22")]);
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = HttpExplorerClient::new(
            "http://127.0.0.1:9090/",
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.explorer_url(), "http://127.0.0.1:9090");
    }
}
