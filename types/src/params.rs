//! Module parameters for multi-staking and liquid staking.

use crate::address::Address;
use crate::coin::Denom;
use serde::{Deserialize, Serialize};

/// Parameters every node must agree on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Native bonding denomination that validator voting power is measured in.
    pub bond_denom: Denom,

    /// Delay between an unbonding request and the release of funds.
    /// Default: 21 days.
    pub unbonding_time_secs: u64,

    /// Escrow account holding deposited coins until they are released.
    pub module_account: Address,

    /// ICS-27 application version requested for new interchain accounts.
    pub ica_version: String,
}

impl Params {
    pub const DEFAULT_UNBONDING_TIME_SECS: u64 = 21 * 24 * 3600;
    pub const DEFAULT_BOND_DENOM: &'static str = "ustake";
    pub const DEFAULT_MODULE_ACCOUNT: &'static str = "istake1mu7tstak3escr0wqqqqqqqqqqqqqqqqqqq";
    pub const ICA_VERSION: &'static str = "ics27-1";
}

impl Default for Params {
    fn default() -> Self {
        Self {
            bond_denom: Denom::parse(Self::DEFAULT_BOND_DENOM).expect("default bond denom is valid"),
            unbonding_time_secs: Self::DEFAULT_UNBONDING_TIME_SECS,
            module_account: Address::parse(Self::DEFAULT_MODULE_ACCOUNT)
                .expect("default module account is valid"),
            ica_version: Self::ICA_VERSION.to_string(),
        }
    }
}
