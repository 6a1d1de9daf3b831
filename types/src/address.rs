//! Bech32-shaped account and validator addresses.
//!
//! Addresses are `<hrp>1<data>`. The human-readable part is lowercase ASCII
//! letters and the data part uses the bech32 character set. The checksum is
//! not verified here; the host runtime owns full address decoding.

use crate::error::TypesError;
use crate::ids::string_newtype_impls;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const MIN_DATA_LEN: usize = 6;
const MAX_LEN: usize = 90;

/// Split a bech32-shaped string into `(hrp, data)` if it is well-formed.
fn split_bech32(s: &str) -> Option<(&str, &str)> {
    if s.len() > MAX_LEN {
        return None;
    }
    let sep = s.rfind('1')?;
    let (hrp, data) = (&s[..sep], &s[sep + 1..]);
    let hrp_ok = !hrp.is_empty() && hrp.chars().all(|c| c.is_ascii_lowercase());
    let data_ok = data.len() >= MIN_DATA_LEN && data.chars().all(|c| BECH32_CHARSET.contains(c));
    (hrp_ok && data_ok).then_some((hrp, data))
}

/// An account address on the home chain or on a source chain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match split_bech32(&s) {
            Some(_) => Ok(Self(s)),
            None => Err(TypesError::InvalidAddress(s)),
        }
    }

    /// The human-readable prefix, e.g. `cosmos` for `cosmos1...`.
    pub fn hrp(&self) -> &str {
        split_bech32(&self.0).map(|(hrp, _)| hrp).unwrap_or_default()
    }

    pub fn has_prefix(&self, hrp: &str) -> bool {
        self.hrp() == hrp
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validator operator address on the home chain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatorAddress(String);

impl ValidatorAddress {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match split_bech32(&s) {
            Some(_) => Ok(Self(s)),
            None => Err(TypesError::InvalidAddress(s)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

string_newtype_impls!(Address);
string_newtype_impls!(ValidatorAddress);

/// Whether `hrp` is usable as a bech32 human-readable prefix.
pub fn is_valid_hrp(hrp: &str) -> bool {
    !hrp.is_empty() && hrp.len() <= 83 && hrp.chars().all(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_address() {
        let addr = Address::parse("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5").unwrap();
        assert_eq!(addr.hrp(), "cosmos");
        assert!(addr.has_prefix("cosmos"));
        assert!(!addr.has_prefix("osmo"));
    }

    #[test]
    fn rejects_missing_separator_and_bad_charset() {
        assert!(Address::parse("cosmosqypqxpq9").is_err());
        assert!(Address::parse("cosmos1abc").is_err()); // too short
        assert!(Address::parse("cosmos1bbbbbbbb").is_err()); // 'b' not in charset
        assert!(Address::parse("Cosmos1qqqqqqqq").is_err());
        assert!(Address::parse("1qqqqqqqq").is_err());
    }

    #[test]
    fn validator_address_uses_same_shape() {
        assert!(ValidatorAddress::parse("istakevaloper1qqqqqq").is_ok());
        assert!(ValidatorAddress::parse("istakevaloper").is_err());
    }

    #[test]
    fn hrp_validation() {
        assert!(is_valid_hrp("cosmos"));
        assert!(!is_valid_hrp(""));
        assert!(!is_valid_hrp("Cosmos"));
    }
}
