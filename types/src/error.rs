//! Top-level error type shared across crates.

use thiserror::Error;

use crate::amount::AmountUnderflow;

/// Common error type for parsing and arithmetic on wallet types.
#[derive(Debug, Error)]
pub enum FerryError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid asset id: {0}")]
    InvalidAssetId(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    AmountUnderflow(#[from] AmountUnderflow),
}
