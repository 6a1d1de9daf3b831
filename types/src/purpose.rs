//! The three purpose-bound interchain accounts every source chain needs.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountPurpose {
    /// Holds delegations on the source chain.
    Delegate,
    /// Receives staking rewards.
    Withdraw,
    /// Receives undelegated funds before they are sent home.
    Unbond,
}

impl AccountPurpose {
    pub const ALL: [AccountPurpose; 3] = [Self::Delegate, Self::Withdraw, Self::Unbond];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delegate => "delegate",
            Self::Withdraw => "withdraw",
            Self::Unbond => "unbond",
        }
    }

    pub fn from_suffix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for AccountPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
