//! Address hash type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FerryError;

/// Base58 alphabet used by ledger addresses.
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// The base58 hash identifying one wallet address on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressHash(String);

impl AddressHash {
    /// Parse an address hash, rejecting empty strings and non-base58 characters.
    pub fn parse(raw: &str) -> Result<Self, FerryError> {
        if raw.is_empty() || !raw.chars().all(|c| BASE58_ALPHABET.contains(c)) {
            return Err(FerryError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AddressHash {
    type Err = FerryError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AddressHash {
    type Error = FerryError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AddressHash> for String {
    fn from(hash: AddressHash) -> Self {
        hash.0
    }
}

impl fmt::Display for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_base58() {
        let a = AddressHash::parse("1DrDyTr9RpRsQnDnXo2YRiPzPW4ooHX5LLoqXrqfMrpQH").unwrap();
        assert_eq!(a.as_str(), "1DrDyTr9RpRsQnDnXo2YRiPzPW4ooHX5LLoqXrqfMrpQH");
    }

    #[test]
    fn rejects_empty_and_ambiguous_characters() {
        assert!(AddressHash::parse("").is_err());
        // 0, O, I and l are not part of base58
        assert!(AddressHash::parse("addr0").is_err());
        assert!(AddressHash::parse("Oops").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<AddressHash, _> = serde_json::from_str("\"addr1\"");
        assert!(ok.is_ok());
        let bad: Result<AddressHash, _> = serde_json::from_str("\"not valid\"");
        assert!(bad.is_err());
    }
}
