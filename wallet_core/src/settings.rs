//! Settings consumed by the send path.

use serde::{Deserialize, Serialize};

/// Read access to user settings.
pub trait SettingsStore: Send + Sync {
    /// Whether the user must authenticate before every send.
    fn require_auth(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSettings {
    pub require_auth: bool,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self { require_auth: true }
    }
}

impl SettingsStore for WalletSettings {
    fn require_auth(&self) -> bool {
        self.require_auth
    }
}
