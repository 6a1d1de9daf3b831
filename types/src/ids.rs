//! Identifiers for foreign chains and the IBC objects that connect to them.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a foreign chain, e.g. `cosmoshub-4`.
///
/// Up to 64 characters from `[A-Za-z0-9._-]`, never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let valid = !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(Self(s))
        } else {
            Err(TypesError::InvalidChainId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parse `<prefix>-<u64>` and return the numeric suffix.
fn numbered_suffix(s: &str, prefix: &str) -> Option<u64> {
    let rest = s.strip_prefix(prefix)?.strip_prefix('-')?;
    if rest.is_empty() || (rest.len() > 1 && rest.starts_with('0')) {
        return None;
    }
    rest.parse().ok()
}

/// An IBC connection identifier, `connection-<n>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId(String);

impl ConnectionId {
    pub const PREFIX: &'static str = "connection";

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match numbered_suffix(&s, Self::PREFIX) {
            Some(_) => Ok(Self(s)),
            None => Err(TypesError::InvalidConnectionId(s)),
        }
    }

    pub fn new(sequence: u64) -> Self {
        Self(format!("{}-{}", Self::PREFIX, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An IBC channel identifier, `channel-<n>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    pub const PREFIX: &'static str = "channel";

    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match numbered_suffix(&s, Self::PREFIX) {
            Some(_) => Ok(Self(s)),
            None => Err(TypesError::InvalidChannelId(s)),
        }
    }

    pub fn new(sequence: u64) -> Self {
        Self(format!("{}-{}", Self::PREFIX, sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = TypesError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = TypesError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> String {
                v.0
            }
        }
    };
}

string_newtype_impls!(ChainId);
string_newtype_impls!(ConnectionId);
string_newtype_impls!(ChannelId);

pub(crate) use string_newtype_impls;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_accepts_common_forms() {
        for raw in ["cosmoshub-4", "chain-A", "osmosis_1", "evmos_9001-2"] {
            assert!(ChainId::parse(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn chain_id_rejects_empty_and_bad_chars() {
        assert!(ChainId::parse("").is_err());
        assert!(ChainId::parse("chain A").is_err());
        assert!(ChainId::parse("x".repeat(65)).is_err());
    }

    #[test]
    fn connection_id_requires_numbered_suffix() {
        assert!(ConnectionId::parse("connection-0").is_ok());
        assert!(ConnectionId::parse("connection-12").is_ok());
        assert!(ConnectionId::parse("connection-").is_err());
        assert!(ConnectionId::parse("connection-01").is_err());
        assert!(ConnectionId::parse("channel-0").is_err());
        assert_eq!(ConnectionId::new(7).as_str(), "connection-7");
    }

    #[test]
    fn channel_id_requires_numbered_suffix() {
        assert!(ChannelId::parse("channel-3").is_ok());
        assert!(ChannelId::parse("channel-x").is_err());
    }

    #[test]
    fn serde_rejects_invalid_ids() {
        let ok: Result<ConnectionId, _> = serde_json::from_str("\"connection-4\"");
        assert!(ok.is_ok());
        let bad: Result<ConnectionId, _> = serde_json::from_str("\"conn-4\"");
        assert!(bad.is_err());
    }
}
