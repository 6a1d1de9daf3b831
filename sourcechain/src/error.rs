use interstake_ica::IcaError;
use interstake_store::StoreError;
use interstake_types::{ChainId, ErrorKind};
use thiserror::Error;

use crate::host::ClientStatus;

#[derive(Debug, Error)]
pub enum SourceChainError {
    #[error("invalid source chain: {0}")]
    InvalidParameter(String),

    #[error("light client for {0} not found")]
    ClientNotFound(ChainId),

    #[error("light client for {chain_id} is {status}, not active")]
    ClientNotActive {
        chain_id: ChainId,
        status: ClientStatus,
    },

    #[error("IBC transfer disabled (send: {send_enabled}, receive: {receive_enabled})")]
    TransferDisabled {
        send_enabled: bool,
        receive_enabled: bool,
    },

    #[error("source chain {0} already exists")]
    AlreadyExists(ChainId),

    #[error("source chain {0} not found")]
    NotFound(ChainId),

    #[error("source chain {0} is not available")]
    NotAvailable(ChainId),

    #[error("interchain account registration failed: {0}")]
    Registration(#[from] IcaError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SourceChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::ClientNotFound(_)
            | Self::ClientNotActive { .. }
            | Self::TransferDisabled { .. }
            | Self::AlreadyExists(_)
            | Self::NotAvailable(_) => ErrorKind::PreconditionFailed,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Registration(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
