//! Nullable node: scripted build, sweep and submit responses.

use async_trait::async_trait;
use ferry_types::{Amount, AssetAmount, AddressHash, TxHash};
use ferry_wallet_core::{Address, NodeClient, NodeError, UnsignedTx, UnsignedTxBatch};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::lock;

/// A call the node received, for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeCall {
    Build {
        from: AddressHash,
        to: AddressHash,
        assets: Vec<AssetAmount>,
    },
    Sweep {
        from: AddressHash,
        to: AddressHash,
    },
    Submit {
        from: AddressHash,
        tx_id: TxHash,
    },
}

/// A node that answers from per-operation queues.
///
/// Build and sweep calls fail when their queue is empty. Submissions with no
/// scripted response are accepted under the id they were built with.
#[derive(Default)]
pub struct NullNodeClient {
    builds: Mutex<VecDeque<Result<UnsignedTxBatch, NodeError>>>,
    sweeps: Mutex<VecDeque<Result<UnsignedTxBatch, NodeError>>>,
    submissions: Mutex<VecDeque<Result<TxHash, NodeError>>>,
    calls: Mutex<Vec<NodeCall>>,
}

impl NullNodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_build(&self, response: Result<UnsignedTxBatch, NodeError>) -> &Self {
        lock(&self.builds).push_back(response);
        self
    }

    pub fn push_sweep(&self, response: Result<UnsignedTxBatch, NodeError>) -> &Self {
        lock(&self.sweeps).push_back(response);
        self
    }

    pub fn push_submit(&self, response: Result<TxHash, NodeError>) -> &Self {
        lock(&self.submissions).push_back(response);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<NodeCall> {
        lock(&self.calls).clone()
    }

    /// Ids of every submission attempt, accepted or not.
    pub fn submitted_tx_ids(&self) -> Vec<TxHash> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                NodeCall::Submit { tx_id, .. } => Some(tx_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// A batch of `tx_ids` (payload `unsigned:<id>`) costing `fees` in total.
    pub fn batch(tx_ids: &[&str], fees: u64) -> UnsignedTxBatch {
        let txs = tx_ids
            .iter()
            .map(|id| UnsignedTx {
                tx_id: TxHash::new(*id),
                unsigned_tx: format!("unsigned:{id}"),
            })
            .collect();
        UnsignedTxBatch::new(txs, Amount::from(fees))
    }

    /// An API error carrying `detail`, as the node sends it.
    pub fn api_error(detail: &str) -> NodeError {
        NodeError::Api {
            status: 500,
            detail: Some(detail.to_string()),
        }
    }

    /// The error the node returns when the source address must be consolidated.
    pub fn consolidation_error() -> NodeError {
        Self::api_error("Please consolidate your wallet's funds")
    }

    fn record(&self, call: NodeCall) {
        lock(&self.calls).push(call);
    }
}

fn unscripted(operation: &str) -> NodeError {
    NodeError::Request(format!("no scripted {operation} response"))
}

#[async_trait]
impl NodeClient for NullNodeClient {
    async fn build_unsigned_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
        assets: &[AssetAmount],
    ) -> Result<UnsignedTxBatch, NodeError> {
        self.record(NodeCall::Build {
            from: from.hash.clone(),
            to: to.clone(),
            assets: assets.to_vec(),
        });
        lock(&self.builds)
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("build")))
    }

    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<UnsignedTxBatch, NodeError> {
        self.record(NodeCall::Sweep {
            from: from.hash.clone(),
            to: to.clone(),
        });
        lock(&self.sweeps)
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("sweep")))
    }

    async fn sign_and_send_transaction(
        &self,
        from: &Address,
        tx_id: &TxHash,
        _unsigned_tx: &str,
    ) -> Result<TxHash, NodeError> {
        self.record(NodeCall::Submit {
            from: from.hash.clone(),
            tx_id: tx_id.clone(),
        });
        lock(&self.submissions)
            .pop_front()
            .unwrap_or_else(|| Ok(tx_id.clone()))
    }
}
