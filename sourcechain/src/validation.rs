//! Stateless checks on a source chain submitted for registration.

use interstake_store::SourceChain;
use interstake_types::address::is_valid_hrp;
use interstake_types::AccountPurpose;

use crate::SourceChainError;

/// Structural validation. Runs before any host lookup or state change.
///
/// Identifier and denom grammar is already enforced by the types; this adds
/// the cross-field rules.
pub fn validate_basic(chain: &SourceChain) -> Result<(), SourceChainError> {
    if !is_valid_hrp(&chain.bech32_prefix) {
        return Err(SourceChainError::InvalidParameter(format!(
            "bech32 prefix {:?} is not a valid human-readable part",
            chain.bech32_prefix
        )));
    }
    if !chain.ibc_denom.is_ibc() {
        return Err(SourceChainError::InvalidParameter(format!(
            "ibc denom {} must have the form ibc/<hash>",
            chain.ibc_denom
        )));
    }
    if chain.native_denom.is_ibc() {
        return Err(SourceChainError::InvalidParameter(format!(
            "native denom {} must be the source chain's own denom",
            chain.native_denom
        )));
    }
    for purpose in AccountPurpose::ALL {
        if let Some(addr) = chain.address(purpose) {
            return Err(SourceChainError::InvalidParameter(format!(
                "{} address {} must be empty; it is assigned by account registration",
                purpose, addr
            )));
        }
    }
    Ok(())
}
