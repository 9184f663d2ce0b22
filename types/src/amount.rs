//! Arbitrary-precision token amounts.
//!
//! The native unit has 18 fractional digits, so amounts are stored as
//! unsigned big integers in the smallest unit. There is no floating point
//! anywhere in the amount path, and subtraction never produces a negative
//! result: it either succeeds or fails with [`AmountUnderflow`].

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;
use thiserror::Error;

use crate::error::FerryError;

/// Subtraction would have gone below zero.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("amount underflow: cannot subtract {subtrahend} from {minuend}")]
pub struct AmountUnderflow {
    pub minuend: Amount,
    pub subtrahend: Amount,
}

/// An unsigned amount in the smallest unit of an asset.
///
/// Serialized as a decimal string, which is how the node and explorer APIs
/// carry amounts.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self - other`, or [`AmountUnderflow`] if `other > self`.
    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountUnderflow> {
        if other.0 > self.0 {
            return Err(AmountUnderflow {
                minuend: self.clone(),
                subtrahend: other.clone(),
            });
        }
        Ok(Self(&self.0 - &other.0))
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(BigUint::from(raw))
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(BigUint::from(raw))
    }
}

impl From<BigUint> for Amount {
    fn from(raw: BigUint) -> Self {
        Self(raw)
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for Amount {
    type Output = Amount;
    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(self.0 + &rhs.0)
    }
}

impl Mul<u64> for &Amount {
    type Output = Amount;
    fn mul(self, rhs: u64) -> Amount {
        Amount(&self.0 * BigUint::from(rhs))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

impl FromStr for Amount {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FerryError::InvalidAmount(s.to_string()));
        }
        BigUint::from_str(s)
            .map(Self)
            .map_err(|_| FerryError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
