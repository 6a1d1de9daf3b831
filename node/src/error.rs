use interstake_equivalence::EquivalenceError;
use interstake_multistaking::LedgerError;
use interstake_sourcechain::SourceChainError;
use interstake_store::StoreError;
use interstake_store_lmdb::LmdbError;
use interstake_types::ErrorKind;
use interstake_unbonding::{BankError, UnbondingError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("source chain error: {0}")]
    SourceChain(#[from] SourceChainError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("equivalence error: {0}")]
    Equivalence(#[from] EquivalenceError),

    #[error("unbonding error: {0}")]
    Unbonding(#[from] UnbondingError),

    #[error("bank error: {0}")]
    Bank(#[from] BankError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] LmdbError),

    #[error("invalid request: {0}")]
    InvalidParameter(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("genesis error: {0}")]
    Genesis(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceChain(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Equivalence(e) => e.kind(),
            Self::Unbonding(e) => e.kind(),
            Self::Bank(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Lmdb(_) | Self::Io(_) => ErrorKind::Storage,
            Self::InvalidParameter(_) | Self::Config(_) | Self::Genesis(_) => {
                ErrorKind::InvalidParameter
            }
        }
    }
}
