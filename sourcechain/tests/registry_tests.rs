//! Source chain registry against nullable host collaborators.

use std::sync::Arc;

use interstake_ica::{owner_key, IcaRegistrar, RegistrationState};
use interstake_nullables::{NullIcaTransport, NullLightClients, NullStore, NullTransferParams};
use interstake_sourcechain::{ClientStatus, SourceChain, SourceChainError, SourceChainRegistry};
use interstake_types::{
    AccountPurpose, Address, BlockContext, ChainId, ChannelId, ConnectionId, Denom, ErrorKind,
    Timestamp,
};

struct Harness {
    transport: Arc<NullIcaTransport>,
    clients: Arc<NullLightClients>,
    transfer: Arc<NullTransferParams>,
    registry: SourceChainRegistry,
}

fn harness() -> Harness {
    let store = Arc::new(NullStore::new());
    let transport = Arc::new(NullIcaTransport::new());
    let clients = Arc::new(NullLightClients::new().with_active(&chain_id("chain-A")));
    let transfer = Arc::new(NullTransferParams::enabled());
    let registry = SourceChainRegistry::new(
        store,
        IcaRegistrar::new(transport.clone()),
        clients.clone(),
        transfer.clone(),
        "ics27-1",
    );
    Harness {
        transport,
        clients,
        transfer,
        registry,
    }
}

fn chain_id(s: &str) -> ChainId {
    ChainId::parse(s).unwrap()
}

fn ctx() -> BlockContext {
    BlockContext::new(10, Timestamp::new(1_000))
}

fn chain(id: &str, conn: u64) -> SourceChain {
    SourceChain {
        chain_id: chain_id(id),
        connection_id: ConnectionId::new(conn),
        transfer_channel_id: ChannelId::new(conn),
        bech32_prefix: "cosmos".into(),
        native_denom: Denom::parse("uatom").unwrap(),
        ibc_denom: Denom::parse(format!("ibc/{}ATOM", id.to_uppercase())).unwrap(),
        delegate_address: None,
        withdraw_address: None,
        unbond_address: None,
        active: false,
        registered_height: 0,
    }
}

fn remote(purpose: AccountPurpose) -> Address {
    let data = match purpose {
        AccountPurpose::Delegate => "qqqqqqqq",
        AccountPurpose::Withdraw => "pppppppp",
        AccountPurpose::Unbond => "zzzzzzzz",
    };
    Address::parse(format!("cosmos1{data}")).unwrap()
}

fn confirm(h: &Harness, chain: &SourceChain, purpose: AccountPurpose) {
    let owner = owner_key(&chain.chain_id, purpose);
    h.transport
        .confirm(&chain.connection_id, &owner, remote(purpose));
}

#[test]
fn add_persists_pending_chain_and_requests_three_accounts() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();

    assert!(stored.active);
    assert_eq!(stored.registered_height, 10);
    assert!(stored.is_pending());
    assert_eq!(h.registry.get_source_chain(&chain_id("chain-A")).unwrap(), Some(stored.clone()));
    assert!(!h.registry.is_available(&stored));

    let owners: Vec<String> = h.transport.requests().into_iter().map(|r| r.owner).collect();
    assert_eq!(
        owners,
        vec!["chain-A.delegate", "chain-A.withdraw", "chain-A.unbond"]
    );
}

#[test]
fn available_only_once_all_accounts_resolve_in_any_order() {
    use AccountPurpose::*;
    let orders = [
        [Delegate, Withdraw, Unbond],
        [Delegate, Unbond, Withdraw],
        [Withdraw, Delegate, Unbond],
        [Withdraw, Unbond, Delegate],
        [Unbond, Delegate, Withdraw],
        [Unbond, Withdraw, Delegate],
    ];
    for order in orders {
        let h = harness();
        let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
        for (i, purpose) in order.iter().enumerate() {
            assert!(!h.registry.is_available(&stored), "available after {i} of 3");
            confirm(&h, &stored, *purpose);
        }
        assert!(h.registry.is_available(&stored));
        assert!(h.registry.is_available_by_id(&stored.chain_id));
    }
}

#[test]
fn duplicate_chain_is_rejected_and_first_is_unchanged() {
    let h = harness();
    let first = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();

    let err = h
        .registry
        .add_source_chain(chain("chain-A", 4), BlockContext::new(11, Timestamp::new(1_005)))
        .unwrap_err();
    assert!(matches!(err, SourceChainError::AlreadyExists(_)));
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(h.registry.get_source_chain(&chain_id("chain-A")).unwrap(), Some(first));
    assert_eq!(h.transport.request_count(), 3);
}

#[test]
fn missing_or_inactive_client_is_rejected() {
    let h = harness();
    let err = h.registry.add_source_chain(chain("chain-B", 1), ctx()).unwrap_err();
    assert!(matches!(err, SourceChainError::ClientNotFound(_)));

    h.clients.set_status(&chain_id("chain-B"), ClientStatus::Frozen);
    let err = h.registry.add_source_chain(chain("chain-B", 1), ctx()).unwrap_err();
    assert!(matches!(
        err,
        SourceChainError::ClientNotActive {
            status: ClientStatus::Frozen,
            ..
        }
    ));
    assert!(h.registry.get_source_chain(&chain_id("chain-B")).unwrap().is_none());
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn disabled_transfer_is_rejected() {
    let h = harness();
    h.transfer.set_receive_enabled(false);
    let err = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap_err();
    assert!(matches!(
        err,
        SourceChainError::TransferDisabled {
            send_enabled: true,
            receive_enabled: false
        }
    ));
    assert!(h.registry.list_source_chains().unwrap().is_empty());
}

#[test]
fn prefilled_address_is_invalid() {
    let h = harness();
    let mut c = chain("chain-A", 0);
    c.delegate_address = Some(remote(AccountPurpose::Delegate));
    let err = h.registry.add_source_chain(c, ctx()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn transport_failure_leaves_chain_unregistered() {
    let h = harness();
    h.transport.fail_requests(true);
    let err = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalTransportFailure);
    assert!(h.registry.get_source_chain(&chain_id("chain-A")).unwrap().is_none());
}

#[test]
fn absent_chain_is_none_and_unavailable() {
    let h = harness();
    assert!(h.registry.get_source_chain(&chain_id("nope")).unwrap().is_none());
    assert!(!h.registry.is_available_by_id(&chain_id("nope")));
    assert!(matches!(
        h.registry.require_source_chain(&chain_id("nope")),
        Err(SourceChainError::NotFound(_))
    ));
}

#[test]
fn account_confirmation_fills_record() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    confirm(&h, &stored, AccountPurpose::Withdraw);

    let updated = h
        .registry
        .handle_account_active(&stored.connection_id, "chain-A.withdraw")
        .unwrap()
        .unwrap();
    assert_eq!(updated.withdraw_address, Some(remote(AccountPurpose::Withdraw)));
    assert!(updated.delegate_address.is_none());

    // Not yet confirmed by the counterparty.
    assert!(h
        .registry
        .handle_account_active(&stored.connection_id, "chain-A.delegate")
        .unwrap()
        .is_none());
}

#[test]
fn account_confirmation_checks_owner_and_connection() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    confirm(&h, &stored, AccountPurpose::Delegate);

    let err = h
        .registry
        .handle_account_active(&ConnectionId::new(9), "chain-A.delegate")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = h
        .registry
        .handle_account_active(&stored.connection_id, "chain-A.rewards")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn sync_pulls_all_resolved_addresses() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    for purpose in AccountPurpose::ALL {
        confirm(&h, &stored, purpose);
    }
    let synced = h.registry.sync_addresses(&stored.chain_id).unwrap();
    assert!(!synced.is_pending());
    assert_eq!(synced.unbond_address, Some(remote(AccountPurpose::Unbond)));
}

#[test]
fn retry_only_rerequests_inactive_accounts() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    confirm(&h, &stored, AccountPurpose::Delegate);

    let retried = h.registry.retry_pending_registrations(&stored.chain_id).unwrap();
    assert_eq!(retried, vec![AccountPurpose::Withdraw, AccountPurpose::Unbond]);
    assert_eq!(h.transport.request_count(), 5);
}

#[test]
fn account_statuses_report_progress() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    confirm(&h, &stored, AccountPurpose::Unbond);

    let statuses = h.registry.account_statuses(&stored);
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].state, Some(RegistrationState::Requested));
    assert_eq!(statuses[0].owner, "chain-A.delegate");
    assert_eq!(statuses[2].state, Some(RegistrationState::Active));
    assert_eq!(statuses[2].address, Some(remote(AccountPurpose::Unbond)));
}

#[test]
fn deactivated_chain_is_not_usable() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    for purpose in AccountPurpose::ALL {
        confirm(&h, &stored, purpose);
    }
    assert!(h.registry.ensure_usable(&stored.chain_id).is_ok());

    let deactivated = h.registry.deactivate_source_chain(&stored.chain_id).unwrap();
    assert!(!deactivated.active);
    assert!(matches!(
        h.registry.ensure_usable(&stored.chain_id),
        Err(SourceChainError::NotAvailable(_))
    ));
}

#[test]
fn pending_chain_is_not_usable() {
    let h = harness();
    let stored = h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    assert!(matches!(
        h.registry.ensure_usable(&stored.chain_id),
        Err(SourceChainError::NotAvailable(_))
    ));
}

#[test]
fn lookup_by_ibc_denom() {
    let h = harness();
    h.clients.set_status(&chain_id("chain-B"), ClientStatus::Active);
    h.registry.add_source_chain(chain("chain-A", 0), ctx()).unwrap();
    h.registry.add_source_chain(chain("chain-B", 1), ctx()).unwrap();

    let denom = Denom::parse("ibc/CHAIN-BATOM").unwrap();
    let found = h.registry.find_by_ibc_denom(&denom).unwrap().unwrap();
    assert_eq!(found.chain_id, chain_id("chain-B"));
    assert!(h
        .registry
        .find_by_ibc_denom(&Denom::parse("ibc/NONE").unwrap())
        .unwrap()
        .is_none());
    assert_eq!(h.registry.list_source_chains().unwrap().len(), 2);
}
