//! Source chain storage trait.

use crate::StoreError;
use interstake_types::{AccountPurpose, Address, ChainId, ChannelId, ConnectionId, Denom};
use serde::{Deserialize, Serialize};

/// A foreign chain enrolled for liquid staking.
///
/// The three remote account addresses start empty and are filled in as the
/// counterparty confirms each interchain account registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceChain {
    pub chain_id: ChainId,
    pub connection_id: ConnectionId,
    /// Transfer channel used to move tokens between the two chains.
    pub transfer_channel_id: ChannelId,
    /// Account prefix on the source chain, e.g. `cosmos`.
    pub bech32_prefix: String,
    /// Staking denom on the source chain, e.g. `uatom`.
    pub native_denom: Denom,
    /// The voucher denom of `native_denom` on the home chain.
    pub ibc_denom: Denom,
    #[serde(default)]
    pub delegate_address: Option<Address>,
    #[serde(default)]
    pub withdraw_address: Option<Address>,
    #[serde(default)]
    pub unbond_address: Option<Address>,
    /// Inactive chains reject new deposits and unbonding requests.
    pub active: bool,
    /// Height of the block that registered this chain.
    pub registered_height: u64,
}

impl SourceChain {
    pub fn address(&self, purpose: AccountPurpose) -> Option<&Address> {
        match purpose {
            AccountPurpose::Delegate => self.delegate_address.as_ref(),
            AccountPurpose::Withdraw => self.withdraw_address.as_ref(),
            AccountPurpose::Unbond => self.unbond_address.as_ref(),
        }
    }

    pub fn set_address(&mut self, purpose: AccountPurpose, address: Address) {
        let slot = match purpose {
            AccountPurpose::Delegate => &mut self.delegate_address,
            AccountPurpose::Withdraw => &mut self.withdraw_address,
            AccountPurpose::Unbond => &mut self.unbond_address,
        };
        *slot = Some(address);
    }

    /// True while any of the three remote addresses is still unknown.
    pub fn is_pending(&self) -> bool {
        AccountPurpose::ALL.iter().any(|p| self.address(*p).is_none())
    }
}

/// Keyed by `chain_id`.
pub trait SourceChainStore {
    fn put_source_chain(&self, chain: &SourceChain) -> Result<(), StoreError>;
    fn get_source_chain(&self, chain_id: &ChainId) -> Result<Option<SourceChain>, StoreError>;
    fn source_chain_exists(&self, chain_id: &ChainId) -> Result<bool, StoreError>;

    /// All source chains in `chain_id` order.
    fn iter_source_chains(&self) -> Result<Vec<SourceChain>, StoreError>;
}
