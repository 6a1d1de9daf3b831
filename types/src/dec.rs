//! Fixed-point decimal with 18 fractional digits.
//!
//! Exchange rates are stored as `raw / 10^18` over an unsigned `u128`, the
//! same precision the Cosmos SDK uses for its legacy decimal type. All
//! conversions truncate toward zero.

use crate::error::TypesError;
use crate::math::mul_div_floor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dec(u128);

impl Dec {
    pub const PRECISION: u32 = 18;
    pub const SCALE: u128 = 1_000_000_000_000_000_000;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::SCALE);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn from_int(n: u128) -> Option<Self> {
        n.checked_mul(Self::SCALE).map(Self)
    }

    /// `numerator / denominator`, truncated. `None` if `denominator` is zero
    /// or the result overflows.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Option<Self> {
        mul_div_floor(numerator, Self::SCALE, denominator).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `floor(amount * self)`, or `None` if the result does not fit in a u128.
    ///
    /// The product is taken at 256-bit width, so only the result can
    /// overflow.
    pub fn checked_mul_int_truncate(&self, amount: u128) -> Option<u128> {
        mul_div_floor(amount, self.0, Self::SCALE)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        write!(f, "{}.{:018}", int, frac)
    }
}

impl FromStr for Dec {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TypesError::InvalidDecimal(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty()
            || !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.len() > Self::PRECISION as usize
            || (s.contains('.') && frac_part.is_empty())
        {
            return Err(err());
        }
        let int: u128 = int_part.parse().map_err(|_| err())?;
        let mut frac: u128 = 0;
        if !frac_part.is_empty() {
            let padding = Self::PRECISION - frac_part.len() as u32;
            frac = frac_part.parse::<u128>().map_err(|_| err())? * 10u128.pow(padding);
        }
        int.checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac))
            .map(Self)
            .ok_or_else(err)
    }
}

impl TryFrom<String> for Dec {
    type Error = TypesError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Dec> for String {
    fn from(d: Dec) -> String {
        d.to_string()
    }
}
