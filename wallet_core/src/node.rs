//! Node client boundary.
//!
//! The wallet talks to the ledger node through [`NodeClient`]. Everything the
//! orchestrator needs from the node is the three calls below; the wire format
//! lives in [`crate::http::HttpNodeClient`].

use async_trait::async_trait;
use ferry_types::{Amount, AssetAmount, AddressHash, TxHash};
use thiserror::Error;

use crate::address::Address;
use crate::auth::SignerError;

/// One transaction ready to be signed and submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTx {
    pub tx_id: TxHash,
    pub unsigned_tx: String,
}

/// The result of a successful build or sweep build.
///
/// Immutable once produced. A new build replaces the whole batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTxBatch {
    unsigned_txs: Vec<UnsignedTx>,
    fees: Amount,
}

impl UnsignedTxBatch {
    pub fn new(unsigned_txs: Vec<UnsignedTx>, fees: Amount) -> Self {
        Self { unsigned_txs, fees }
    }

    /// Entries in submission order.
    pub fn unsigned_txs(&self) -> &[UnsignedTx] {
        &self.unsigned_txs
    }

    pub fn fees(&self) -> &Amount {
        &self.fees
    }

    pub fn len(&self) -> usize {
        self.unsigned_txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unsigned_txs.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum NodeError {
    /// The node answered with a non-success status, optionally carrying a
    /// free-text `detail`.
    #[error("node returned HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid node response: {0}")]
    Decode(String),

    #[error(transparent)]
    Signing(#[from] SignerError),
}

/// What a [`NodeError`] means to the send path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeErrorKind {
    /// The source address holds too many small outputs to fund the
    /// transaction; a sweep must merge them first.
    ConsolidationRequired,
    Other,
}

impl NodeError {
    /// The node's free-text explanation, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            NodeError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Classify the error.
    ///
    /// The node has no error code for the consolidation case; it only says so
    /// in `detail`. A detail containing `"consolidating"` or `"consolidate"`
    /// (case-sensitive) is the contract the node currently guarantees.
    // TODO: switch to the node's error code once the build endpoint exposes one.
    pub fn kind(&self) -> NodeErrorKind {
        match self.detail() {
            Some(detail) if detail.contains("consolidating") || detail.contains("consolidate") => {
                NodeErrorKind::ConsolidationRequired
            }
            _ => NodeErrorKind::Other,
        }
    }
}

/// Node operations used by the send path.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Build the unsigned transactions moving `assets` from `from` to `to`.
    async fn build_unsigned_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
        assets: &[AssetAmount],
    ) -> Result<UnsignedTxBatch, NodeError>;

    /// Build the transactions sweeping all funds of `from` into `to`.
    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<UnsignedTxBatch, NodeError>;

    /// Sign `unsigned_tx` with the key of `from` and submit it. Returns the
    /// id the node accepted the transaction under.
    async fn sign_and_send_transaction(
        &self,
        from: &Address,
        tx_id: &TxHash,
        unsigned_tx: &str,
    ) -> Result<TxHash, NodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(detail: Option<&str>) -> NodeError {
        NodeError::Api {
            status: 400,
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn consolidate_detail_is_consolidation_required() {
        let err = api(Some("Please consolidate your wallet's funds"));
        assert_eq!(err.kind(), NodeErrorKind::ConsolidationRequired);
    }

    #[test]
    fn consolidating_detail_is_consolidation_required() {
        let err = api(Some("Too many inputs, consider consolidating UTXOs first"));
        assert_eq!(err.kind(), NodeErrorKind::ConsolidationRequired);
    }

    #[test]
    fn other_details_are_other() {
        assert_eq!(api(Some("insufficient gas")).kind(), NodeErrorKind::Other);
        assert_eq!(api(None).kind(), NodeErrorKind::Other);
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(
            api(Some("Please Consolidate your funds")).kind(),
            NodeErrorKind::Other
        );
    }

    #[test]
    fn transport_errors_have_no_detail() {
        let err = NodeError::Request("connection refused".into());
        assert_eq!(err.detail(), None);
        assert_eq!(err.kind(), NodeErrorKind::Other);
    }

    #[test]
    fn display_includes_detail() {
        assert_eq!(
            api(Some("insufficient gas")).to_string(),
            "node returned HTTP 400: insufficient gas"
        );
    }
}
