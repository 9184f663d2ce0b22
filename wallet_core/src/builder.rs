//! Transaction building on top of the node client.
//!
//! Thin wrappers: no retries, no backoff. A failure goes straight back to the
//! caller, classified so the orchestrator can branch into the sweep flow.

use ferry_types::{AddressHash, AssetAmount};
use thiserror::Error;
use tracing::{debug, info};

use crate::address::Address;
use crate::node::{NodeClient, NodeError, NodeErrorKind, UnsignedTxBatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The node asks for a consolidation before it can fund this send.
    #[error("consolidation of the source address is required")]
    ConsolidationRequired,

    #[error("error while building the transaction: {0}")]
    Generic(String),
}

impl From<NodeError> for BuildError {
    fn from(err: NodeError) -> Self {
        match err.kind() {
            NodeErrorKind::ConsolidationRequired => BuildError::ConsolidationRequired,
            NodeErrorKind::Other => {
                BuildError::Generic(err.detail().map(str::to_string).unwrap_or_else(|| err.to_string()))
            }
        }
    }
}

/// Build the unsigned transactions for a send.
pub async fn build(
    node: &dyn NodeClient,
    from: &Address,
    to: &AddressHash,
    assets: &[AssetAmount],
) -> Result<UnsignedTxBatch, BuildError> {
    debug!(from = %from.hash, to = %to, assets = assets.len(), "building transaction");
    let batch = node
        .build_unsigned_transactions(from, to, assets)
        .await
        .map_err(BuildError::from)?;
    info!(from = %from.hash, txs = batch.len(), fees = %batch.fees(), "transaction built");
    Ok(batch)
}

/// Build the sweep that merges all of `from`'s funds back into itself.
pub async fn build_sweep(node: &dyn NodeClient, from: &Address) -> Result<UnsignedTxBatch, BuildError> {
    debug!(from = %from.hash, "building consolidation sweep");
    let batch = node
        .build_sweep_transactions(from, &from.hash)
        .await
        .map_err(|err| match BuildError::from(err) {
            // A sweep cannot itself need a sweep; surface it as a plain failure.
            BuildError::ConsolidationRequired => {
                BuildError::Generic("the node refused to build a consolidation sweep".into())
            }
            other => other,
        })?;
    info!(from = %from.hash, txs = batch.len(), fees = %batch.fees(), "consolidation sweep built");
    Ok(batch)
}
