//! Asset identifiers and per-asset amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::Amount;
use crate::error::FerryError;

/// A 32-byte asset identifier, carried as 64 lowercase hex characters.
///
/// The all-zero id is the chain's native asset.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Byte length of an asset id.
    pub const LEN: usize = 32;

    /// The native asset of the chain.
    pub fn native() -> Self {
        Self("0".repeat(Self::LEN * 2))
    }

    pub fn parse(raw: &str) -> Result<Self, FerryError> {
        let bytes = hex::decode(raw).map_err(|_| FerryError::InvalidAssetId(raw.to_string()))?;
        if bytes.len() != Self::LEN {
            return Err(FerryError::InvalidAssetId(raw.to_string()));
        }
        Ok(Self(hex::encode(bytes)))
    }

    pub fn is_native(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AssetId {
    type Err = FerryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = FerryError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of one asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetAmount {
    pub id: AssetId,
    pub amount: Amount,
}

impl AssetAmount {
    pub fn new(id: AssetId, amount: impl Into<Amount>) -> Self {
        Self {
            id,
            amount: amount.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_id_is_all_zero() {
        let native = AssetId::native();
        assert!(native.is_native());
        assert_eq!(native.as_str().len(), 64);
    }

    #[test]
    fn parse_normalises_case() {
        let id = AssetId::parse(&"AB".repeat(32)).unwrap();
        assert_eq!(id.as_str(), "ab".repeat(32));
        assert!(!id.is_native());
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!(AssetId::parse("abcd").is_err());
        assert!(AssetId::parse(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn asset_amount_json_shape() {
        let aa = AssetAmount::new(AssetId::native(), 5u64);
        let json = serde_json::to_value(&aa).unwrap();
        assert_eq!(json["amount"], "5");
        assert_eq!(json["id"], AssetId::native().as_str());
    }
}
