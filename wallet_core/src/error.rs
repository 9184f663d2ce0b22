use ferry_types::AddressHash;
use thiserror::Error;

use crate::send::SendState;

/// Errors loading or validating the wallet configuration.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("config error: {0}")]
    Config(String),
}

/// Contract violations on the send orchestrator.
///
/// Runtime failures (a build the node rejects, a submission that fails, a
/// cancelled authentication) are not errors here: they come back as
/// [`crate::BuildOutcome`] / [`crate::SendOutcome`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("source address is not set")]
    MissingFromAddress,

    #[error("destination address is not set")]
    MissingToAddress,

    #[error("address {0} is not known to this wallet")]
    UnknownAddress(AddressHash),

    #[error("send intent cannot change while {0:?}")]
    IntentLocked(SendState),

    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SendState,
    },
}

/// Errors fetching address data from the explorer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("explorer request failed: {0}")]
    Request(String),

    #[error("explorer returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid explorer response: {0}")]
    Decode(String),
}
