//! Fundamental types for the Ferry wallet.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! address hashes, asset identifiers, arbitrary-precision amounts, transaction
//! hashes and millisecond timestamps.

pub mod address;
pub mod amount;
pub mod asset;
pub mod error;
pub mod hash;
pub mod time;

pub use address::AddressHash;
pub use amount::{Amount, AmountUnderflow};
pub use asset::{AssetAmount, AssetId};
pub use error::FerryError;
pub use hash::TxHash;
pub use time::{Clock, SystemClock, Timestamp};
