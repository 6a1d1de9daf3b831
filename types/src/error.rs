//! Error taxonomy shared across crates.

use std::fmt;
use thiserror::Error;

/// Coarse classification every crate error maps onto.
///
/// Callers use this to decide whether a failure is the caller's fault, a
/// precondition of the host chain, or a transient transport problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Never retried automatically.
    InvalidParameter,
    /// A record the operation requires does not exist.
    NotFound,
    /// Host state rejects the operation (client inactive, transfer disabled, duplicate).
    PreconditionFailed,
    /// A debit exceeds the available equivalent stake or balance.
    InsufficientBalance,
    /// The interchain transport or fund release failed; retry on a later block.
    ExternalTransportFailure,
    /// Arithmetic left the representable range.
    Arithmetic,
    /// The storage backend failed.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::NotFound => "not_found",
            Self::PreconditionFailed => "precondition_failed",
            Self::InsufficientBalance => "insufficient_balance",
            Self::ExternalTransportFailure => "external_transport_failure",
            Self::Arithmetic => "arithmetic",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Errors raised while parsing or validating the primitive types in this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid chain id: {0:?}")]
    InvalidChainId(String),

    #[error("invalid connection id: {0:?}")]
    InvalidConnectionId(String),

    #[error("invalid channel id: {0:?}")]
    InvalidChannelId(String),

    #[error("invalid denom: {0:?}")]
    InvalidDenom(String),

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("invalid decimal: {0:?}")]
    InvalidDecimal(String),

    #[error("invalid coin: {0:?}")]
    InvalidCoin(String),
}

impl TypesError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidParameter
    }
}
