//! Shared utilities for the Ferry wallet.

pub mod format;
pub mod logging;

pub use format::format_amount;
pub use logging::{init_logging, LogFormat};
