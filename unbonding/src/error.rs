use interstake_multistaking::LedgerError;
use interstake_store::{AgentSource, StoreError};
use interstake_types::{Address, Denom, ErrorKind, ValidatorAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("insufficient funds in {address}: need {needed}{denom}, have {available}{denom}")]
    InsufficientFunds {
        address: Address,
        denom: Denom,
        needed: u128,
        available: u128,
    },

    #[error("balance of {address} in {denom} overflows")]
    Overflow { address: Address, denom: Denom },

    #[error("{0} does not accept transfers")]
    Blocked(Address),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientBalance,
            Self::Overflow { .. } => ErrorKind::Arithmetic,
            Self::Blocked(_) => ErrorKind::ExternalTransportFailure,
            Self::Store(e) => e.kind(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UnbondingError {
    #[error("invalid unbonding request: {0}")]
    InvalidParameter(String),

    #[error(
        "unbonding would over-commit {validator}/{agent_source}: requested {requested}, free {free}"
    )]
    OverCommitted {
        validator: ValidatorAddress,
        agent_source: AgentSource,
        requested: u128,
        free: u128,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl UnbondingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::OverCommitted { .. } => ErrorKind::InsufficientBalance,
            Self::Ledger(e) => e.kind(),
            Self::Bank(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
