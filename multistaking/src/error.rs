use interstake_equivalence::EquivalenceError;
use interstake_store::{AgentSource, StoreError};
use interstake_types::{Address, ErrorKind, ValidatorAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(
        "insufficient equivalent stake for {validator}/{agent_source}: need {needed}, have {available}"
    )]
    InsufficientBalance {
        validator: ValidatorAddress,
        agent_source: AgentSource,
        needed: u128,
        available: u128,
    },

    #[error("equivalent stake for {validator}/{agent_source} overflows")]
    Overflow {
        validator: ValidatorAddress,
        agent_source: AgentSource,
    },

    #[error("{owner} has no deposit with {validator}/{agent_source}")]
    NoDeposit {
        owner: Address,
        validator: ValidatorAddress,
        agent_source: AgentSource,
    },

    #[error(
        "{owner} requested {requested} from {validator}/{agent_source} but has {deposited} deposited"
    )]
    ExceedsDeposit {
        owner: Address,
        validator: ValidatorAddress,
        agent_source: AgentSource,
        requested: u128,
        deposited: u128,
    },

    #[error("equivalence error: {0}")]
    Equivalence(#[from] EquivalenceError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Overflow { .. } => ErrorKind::Arithmetic,
            Self::NoDeposit { .. } => ErrorKind::InsufficientBalance,
            Self::ExceedsDeposit { .. } => ErrorKind::InsufficientBalance,
            Self::Equivalence(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
