//! Wallet core library for Ferry.
//!
//! Provides the client-side send path of a multi-address wallet:
//! - Per-asset amount bookkeeping without precision loss
//! - Transaction building through the node, including the consolidation (sweep) fallback
//! - The send state machine: build, authenticate, submit sequentially
//! - The pending transaction store and its reconciliation against explorer data
//! - HTTP clients for the node and explorer APIs

pub mod address;
pub mod amounts;
pub mod auth;
pub mod builder;
pub mod config;
pub mod error;
pub mod events;
pub mod explorer;
pub mod http;
pub mod node;
pub mod pending;
pub mod send;
pub mod settings;
pub mod sync;

pub use address::{Address, AddressBook, AddressRepository, TokenBalance};
pub use amounts::{aggregate, AssetAmounts, TransactionAssetAmounts, MIN_UTXO_NATIVE_AMOUNT};
pub use auth::{Authenticator, SignerError, TransactionSigner};
pub use builder::BuildError;
pub use config::WalletConfig;
pub use error::{SendError, SyncError, WalletError};
pub use events::{EventBus, WalletEvent};
pub use explorer::{ExplorerClient, ExplorerTransaction, HttpExplorerClient};
pub use http::HttpNodeClient;
pub use node::{NodeClient, NodeError, NodeErrorKind, UnsignedTx, UnsignedTxBatch};
pub use pending::{PendingStatus, PendingTransaction, PendingTransactionStore, SharedPendingStore};
pub use send::{
    BuildOutcome, Continuation, SendIntent, SendOrchestrator, SendOutcome, SendReceipt, SendState,
};
pub use settings::{SettingsStore, WalletSettings};
pub use sync::{AddressSyncer, AddressTransactions, SyncEvent, SyncPayload};
