//! Fixed-point tTRUST amounts.
//!
//! Every reward amount in QUESTFLOW is carried as an integer number of
//! hundredths of a tTRUST. The ledger stores the raw hundredths; JSON views
//! render a decimal number. Conversion to floating point happens only at the
//! serialization boundary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Hundredths per whole tTRUST.
pub const HUNDREDTHS_PER_TTRUST: u64 = 100;

/// A non-negative tTRUST amount stored as hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttrust(u64);

impl Ttrust {
    pub const ZERO: Ttrust = Ttrust(0);

    /// Build an amount from raw hundredths (the ledger representation).
    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// Build an amount from whole tTRUST.
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * HUNDREDTHS_PER_TTRUST)
    }

    /// Raw hundredths.
    pub const fn hundredths(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtract, flooring at zero.
    pub const fn saturating_sub(self, other: Ttrust) -> Ttrust {
        Ttrust(self.0.saturating_sub(other.0))
    }

    pub const fn saturating_add(self, other: Ttrust) -> Ttrust {
        Ttrust(self.0.saturating_add(other.0))
    }

    /// Decimal value for display. Lossy only beyond 2^53 hundredths.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / HUNDREDTHS_PER_TTRUST as f64
    }

    /// Parse a decimal value, rounding to the nearest hundredth.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let hundredths = (value * HUNDREDTHS_PER_TTRUST as f64).round();
        if hundredths > u64::MAX as f64 {
            return None;
        }
        Some(Self(hundredths as u64))
    }
}

impl Add for Ttrust {
    type Output = Ttrust;

    fn add(self, rhs: Ttrust) -> Ttrust {
        self.saturating_add(rhs)
    }
}

impl Sum for Ttrust {
    fn sum<I: Iterator<Item = Ttrust>>(iter: I) -> Self {
        iter.fold(Ttrust::ZERO, Add::add)
    }
}

impl fmt::Display for Ttrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / HUNDREDTHS_PER_TTRUST;
        let frac = self.0 % HUNDREDTHS_PER_TTRUST;
        if frac == 0 {
            write!(f, "{}", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}", whole, frac)
        }
    }
}

impl Serialize for Ttrust {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Ttrust {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ttrust::from_f64(value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid tTRUST amount: {}", value))
        })
    }
}

/// Serde adapter that writes an amount as its integer hundredths.
///
/// Used for ledger-shaped records (claims, milestone configuration) where the
/// integer is the canonical value.
pub mod hundredths {
    use super::Ttrust;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Ttrust, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(amount.hundredths())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Ttrust, D::Error> {
        u64::deserialize(deserializer).map(Ttrust::from_hundredths)
    }
}
