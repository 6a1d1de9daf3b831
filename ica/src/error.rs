use interstake_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IcaError {
    #[error("interchain account transport failed: {0}")]
    Transport(String),

    #[error("invalid interchain account owner: {0:?}")]
    InvalidOwner(String),

    #[error("failed to encode account metadata: {0}")]
    Metadata(String),
}

impl IcaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::ExternalTransportFailure,
            Self::InvalidOwner(_) | Self::Metadata(_) => ErrorKind::InvalidParameter,
        }
    }
}
