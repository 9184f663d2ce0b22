//! Nullable key store: scripted authentication and fake signatures.

use async_trait::async_trait;
use ferry_wallet_core::{Address, Authenticator, SignerError, TransactionSigner};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::lock;

/// An authentication gate with a fixed answer.
pub struct NullAuthenticator {
    available: bool,
    confirms: bool,
    prompts: AtomicUsize,
}

impl NullAuthenticator {
    /// Available; the user always confirms.
    pub fn confirming() -> Self {
        Self::new(true, true)
    }

    /// Available; the user always cancels.
    pub fn cancelling() -> Self {
        Self::new(true, false)
    }

    /// No PIN or biometrics configured on the device.
    pub fn unavailable() -> Self {
        Self::new(false, false)
    }

    fn new(available: bool, confirms: bool) -> Self {
        Self {
            available,
            confirms,
            prompts: AtomicUsize::new(0),
        }
    }

    /// How many times the user was prompted.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for NullAuthenticator {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn confirm(&self) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.confirms
    }
}

/// A signer producing `sig:<tx_id>` without any key material.
#[derive(Default)]
pub struct NullSigner {
    failure: Option<String>,
    signed: Mutex<Vec<String>>,
}

impl NullSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signer whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            signed: Mutex::new(Vec::new()),
        }
    }

    /// Transaction ids signed so far, in order.
    pub fn signed(&self) -> Vec<String> {
        lock(&self.signed).clone()
    }
}

#[async_trait]
impl TransactionSigner for NullSigner {
    async fn sign(&self, _from: &Address, tx_id: &str) -> Result<String, SignerError> {
        if let Some(reason) = &self.failure {
            return Err(SignerError(reason.clone()));
        }
        lock(&self.signed).push(tx_id.to_string());
        Ok(format!("sig:{tx_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_types::AddressHash;

    #[tokio::test]
    async fn authenticator_counts_prompts() {
        let auth = NullAuthenticator::cancelling();
        assert!(auth.is_available());
        assert!(!auth.confirm().await);
        assert_eq!(auth.prompts(), 1);
    }

    #[tokio::test]
    async fn signer_records_and_fails_on_demand() {
        let from = Address::new(AddressHash::parse("addr1").unwrap(), "pk");
        let signer = NullSigner::new();
        assert_eq!(signer.sign(&from, "t1").await.unwrap(), "sig:t1");
        assert_eq!(signer.signed(), vec!["t1"]);

        let failing = NullSigner::failing("locked");
        assert_eq!(
            failing.sign(&from, "t1").await.unwrap_err(),
            SignerError("locked".into())
        );
    }
}
