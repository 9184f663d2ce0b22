//! Key store boundary: the authentication gate and transaction signing.
//!
//! Both are supplied by the host application. This crate never holds key
//! material and never signs anything itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::address::Address;

/// PIN / biometric confirmation gate.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether an authentication method is configured on this device.
    fn is_available(&self) -> bool;

    /// Prompt the user. Resolves to `true` on success, `false` when the user cancels.
    async fn confirm(&self) -> bool;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("signing failed: {0}")]
pub struct SignerError(pub String);

/// Produces a signature over a transaction id with the key of `from`.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, from: &Address, tx_id: &str) -> Result<String, SignerError>;
}
