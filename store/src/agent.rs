//! Multi-staking agent storage trait.

use crate::StoreError;
use interstake_types::{ChainId, ValidatorAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an agent's equivalent stake comes from.
///
/// `Native` orders before every chain so a validator's own-denom row always
/// comes first when listing.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentSource {
    /// Deposits in the home chain's bonding denomination.
    Native,
    /// Deposits of a source chain's IBC voucher.
    Chain(ChainId),
}

impl AgentSource {
    /// Stable byte encoding used in composite store keys.
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            Self::Native => vec![0x00],
            Self::Chain(id) => {
                let mut out = Vec::with_capacity(1 + id.as_str().len());
                out.push(0x01);
                out.extend_from_slice(id.as_str().as_bytes());
                out
            }
        }
    }

    pub fn chain_id(&self) -> Option<&ChainId> {
        match self {
            Self::Native => None,
            Self::Chain(id) => Some(id),
        }
    }
}

impl fmt::Display for AgentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Chain(id) => write!(f, "{}", id),
        }
    }
}

/// Aggregated equivalent stake for one `(validator, source)` pair, in the
/// bonding denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStakingAgent {
    pub validator: ValidatorAddress,
    pub source: AgentSource,
    pub equivalent_amount: u128,
}

/// Keyed by `(validator, source)`.
pub trait AgentStore {
    fn get_agent(
        &self,
        validator: &ValidatorAddress,
        source: &AgentSource,
    ) -> Result<Option<MultiStakingAgent>, StoreError>;

    fn put_agent(&self, agent: &MultiStakingAgent) -> Result<(), StoreError>;

    /// All agents of one validator, in source key order.
    fn iter_agents_for_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Result<Vec<MultiStakingAgent>, StoreError>;

    /// Every agent, ordered by validator then source.
    fn iter_agents(&self) -> Result<Vec<MultiStakingAgent>, StoreError>;
}
