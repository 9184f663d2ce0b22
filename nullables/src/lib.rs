//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the wallet core sits behind a trait. This crate
//! provides test implementations that:
//! - Return scripted, deterministic values
//! - Record the calls made to them for assertions
//! - Never touch the network or a real key store
//!
//! Usage: swap real implementations for nullables in tests.

pub mod addresses;
pub mod auth;
pub mod clock;
pub mod explorer;
pub mod node;

pub use addresses::NullAddressRepository;
pub use auth::{NullAuthenticator, NullSigner};
pub use clock::NullClock;
pub use explorer::NullExplorer;
pub use node::{NodeCall, NullNodeClient};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock ignoring poisoning; a panicking test must not cascade into others.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
