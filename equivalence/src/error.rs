use interstake_types::{Denom, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EquivalenceError {
    #[error("no exchange rate for {denom} → {target}")]
    UnsupportedDenom { denom: Denom, target: Denom },

    #[error("equivalent amount of {amount}{denom} overflows")]
    Overflow { amount: u128, denom: Denom },
}

impl EquivalenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedDenom { .. } => ErrorKind::InvalidParameter,
            Self::Overflow { .. } => ErrorKind::Arithmetic,
        }
    }
}
