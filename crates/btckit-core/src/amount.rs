//! Exact monetary amounts.
//!
//! An [`Amount`] is an integer count of satoshis. The RPC wire form is a
//! fixed-decimal JSON number with eight fractional digits; conversion in both
//! directions goes through arbitrary-precision decimals so no `f64` ever
//! touches the value. Parsing rejects sub-satoshi precision and anything
//! outside the representable supply.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Satoshis per bitcoin.
pub const COIN: i64 = 100_000_000;

/// Largest representable amount: the 21 million coin supply cap.
pub const MAX_MONEY: i64 = 21_000_000 * COIN;

/// Errors from amount parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),
    #[error("amount has sub-satoshi precision: {0:?}")]
    TooPrecise(String),
    #[error("amount out of range: {0} satoshis exceeds the money supply")]
    OutOfRange(i64),
    #[error("amount arithmetic overflowed")]
    Overflow,
}

/// An exact quantity of bitcoin, counted in satoshis.
///
/// Negative values are permitted (the node reports fees and debits as
/// negative amounts) but magnitude is always bounded by [`MAX_MONEY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero satoshis.
    pub const ZERO: Amount = Amount(0);

    /// One bitcoin.
    pub const ONE_BTC: Amount = Amount(COIN);

    /// Build from a satoshi count, rejecting values outside the money range.
    pub fn from_sat(sats: i64) -> Result<Self, AmountError> {
        if sats == i64::MIN || sats.abs() > MAX_MONEY {
            return Err(AmountError::OutOfRange(sats));
        }
        Ok(Amount(sats))
    }

    /// The satoshi count.
    pub const fn to_sat(self) -> i64 {
        self.0
    }

    /// Parse a fixed-decimal BTC string, e.g. `"0.1"` or `"-0.00002000"`.
    pub fn from_btc_str(s: &str) -> Result<Self, AmountError> {
        let dec =
            Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_string()))?;
        let scaled = dec
            .checked_mul(Decimal::from(COIN))
            .ok_or_else(|| AmountError::Invalid(s.to_string()))?;
        if !scaled.fract().is_zero() {
            return Err(AmountError::TooPrecise(s.to_string()));
        }
        let sats = scaled
            .to_i64()
            .ok_or(AmountError::OutOfRange(i64::MAX))?;
        Self::from_sat(sats)
    }

    /// Canonical fixed-decimal BTC string with eight fractional digits.
    pub fn to_btc_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:08}", abs / COIN as u64, abs % COIN as u64)
    }

    /// Checked addition, bounded by the money range.
    pub fn checked_add(self, rhs: Amount) -> Result<Amount, AmountError> {
        let sum = self.0.checked_add(rhs.0).ok_or(AmountError::Overflow)?;
        Self::from_sat(sum)
    }

    /// Checked subtraction, bounded by the money range.
    pub fn checked_sub(self, rhs: Amount) -> Result<Amount, AmountError> {
        let diff = self.0.checked_sub(rhs.0).ok_or(AmountError::Overflow)?;
        Self::from_sat(diff)
    }

    /// Whether the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_btc_string())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_btc_str(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Emit a JSON number carrying the exact decimal literal. Requires
        // serde_json's arbitrary_precision feature, which this crate enables.
        let number = serde_json::Number::from_str(&self.to_btc_string())
            .map_err(serde::ser::Error::custom)?;
        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        Amount::from_btc_str(&number.to_string()).map_err(serde::de::Error::custom)
    }
}
