//! Coin denominations and amounts.
//!
//! Amounts are raw integer units (u128). Denominations follow the Cosmos SDK
//! grammar so IBC voucher denoms such as `ibc/27394FB0...` are accepted.

use crate::error::TypesError;
use crate::ids::string_newtype_impls;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coin denomination: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Denom(String);

impl Denom {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let mut chars = s.chars();
        let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
        if first_ok && rest_ok && (3..=128).contains(&s.len()) {
            Ok(Self(s))
        } else {
            Err(TypesError::InvalidDenom(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is an IBC voucher denom (`ibc/<hash>`).
    pub fn is_ibc(&self) -> bool {
        self.0.starts_with("ibc/")
    }
}

string_newtype_impls!(Denom);

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: Denom,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: Denom, amount: u128) -> Self {
        Self { denom, amount }
    }

    pub fn zero(denom: Denom) -> Self {
        Self { denom, amount: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parses the `<amount><denom>` form, e.g. `100uatom`.
impl FromStr for Coin {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TypesError::InvalidCoin(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        let amount = amount
            .parse::<u128>()
            .map_err(|_| TypesError::InvalidCoin(s.to_string()))?;
        Ok(Self::new(Denom::parse(denom)?, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denom_grammar() {
        assert!(Denom::parse("uatom").is_ok());
        assert!(Denom::parse("ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2").is_ok());
        assert!(Denom::parse("ab").is_err());
        assert!(Denom::parse("1atom").is_err());
        assert!(Denom::parse("u atom").is_err());
    }

    #[test]
    fn ibc_detection() {
        assert!(Denom::parse("ibc/ABCDEF").unwrap().is_ibc());
        assert!(!Denom::parse("uosmo").unwrap().is_ibc());
    }

    #[test]
    fn coin_parse_and_display() {
        let coin: Coin = "100uatom".parse().unwrap();
        assert_eq!(coin.amount, 100);
        assert_eq!(coin.denom.as_str(), "uatom");
        assert_eq!(coin.to_string(), "100uatom");
        assert!("uatom".parse::<Coin>().is_err());
        assert!("100".parse::<Coin>().is_err());
    }
}
