//! Owner keys binding an interchain account to a chain and a purpose.

use interstake_types::{AccountPurpose, ChainId};

/// Port prefix ICS-27 uses for controller ports.
const CONTROLLER_PORT_PREFIX: &str = "icacontroller-";

/// `<chain_id>.<purpose>`, e.g. `cosmoshub-4.delegate`.
pub fn owner_key(chain_id: &ChainId, purpose: AccountPurpose) -> String {
    format!("{}.{}", chain_id, purpose)
}

/// Inverse of [`owner_key`]. Chain ids may themselves contain dots, so the
/// purpose is taken from the last segment.
pub fn parse_owner_key(owner: &str) -> Option<(ChainId, AccountPurpose)> {
    let (chain, purpose) = owner.rsplit_once('.')?;
    let purpose = AccountPurpose::from_suffix(purpose)?;
    let chain_id = ChainId::parse(chain).ok()?;
    Some((chain_id, purpose))
}

/// `icacontroller-<owner>`.
pub fn controller_port_id(owner: &str) -> String {
    format!("{}{}", CONTROLLER_PORT_PREFIX, owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_layout() {
        let chain = ChainId::parse("cosmoshub-4").unwrap();
        assert_eq!(owner_key(&chain, AccountPurpose::Delegate), "cosmoshub-4.delegate");
        assert_eq!(
            controller_port_id("cosmoshub-4.unbond"),
            "icacontroller-cosmoshub-4.unbond"
        );
    }

    #[test]
    fn parse_handles_dotted_chain_ids() {
        let (chain, purpose) = parse_owner_key("my.chain-1.withdraw").unwrap();
        assert_eq!(chain.as_str(), "my.chain-1");
        assert_eq!(purpose, AccountPurpose::Withdraw);
    }

    #[test]
    fn parse_rejects_unknown_purpose() {
        assert!(parse_owner_key("cosmoshub-4.rewards").is_none());
        assert!(parse_owner_key("cosmoshub-4").is_none());
        assert!(parse_owner_key(".delegate").is_none());
    }
}
