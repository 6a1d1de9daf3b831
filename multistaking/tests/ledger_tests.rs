//! Agent ledger over the in-memory store.

use std::sync::Arc;

use interstake_equivalence::{EquivalenceCalculator, StaticRateTable};
use interstake_multistaking::{AgentLedger, AgentSource, DepositRecord, LedgerError, MultiStakingAgent};
use interstake_nullables::NullStore;
use interstake_store::{BatchStore, WriteBatch};
use interstake_types::{Address, ChainId, Coin, Dec, Denom, ErrorKind, ValidatorAddress};

fn denom(s: &str) -> Denom {
    Denom::parse(s).unwrap()
}

fn validator(data: &str) -> ValidatorAddress {
    ValidatorAddress::parse(format!("istakevaloper1{data}")).unwrap()
}

fn chain(s: &str) -> AgentSource {
    AgentSource::Chain(ChainId::parse(s).unwrap())
}

fn owner(data: &str) -> Address {
    Address::parse(format!("istake1{data}")).unwrap()
}

fn ledger_with_store() -> (AgentLedger, Arc<NullStore>) {
    let rates = StaticRateTable::new().with_rate(denom("ibc/COINX"), "0.5".parse::<Dec>().unwrap());
    let store = Arc::new(NullStore::new());
    let ledger = AgentLedger::new(
        store.clone(),
        store.clone(),
        EquivalenceCalculator::new(Arc::new(rates)),
        denom("ustake"),
    );
    (ledger, store)
}

fn ledger() -> AgentLedger {
    ledger_with_store().0
}

/// Deposit `coins` of COINX at the configured rate and commit.
fn deposit(ledger: &AgentLedger, store: &NullStore, who: &Address, v: &ValidatorAddress, coins: u128) {
    let equivalent = ledger
        .expected_delegation_amount(&Coin::new(denom("ibc/COINX"), coins))
        .unwrap()
        .amount;
    let mut batch = WriteBatch::new();
    ledger
        .stage_deposit(&mut batch, who, v, &chain("chain-A"), coins, equivalent)
        .unwrap();
    store.commit(batch).unwrap();
}

/// Redeem `coins` and commit; returns the equivalent charged.
fn redeem(
    ledger: &AgentLedger,
    store: &NullStore,
    who: &Address,
    v: &ValidatorAddress,
    coins: u128,
) -> Result<u128, LedgerError> {
    let mut batch = WriteBatch::new();
    let equivalent = ledger.stage_redemption(&mut batch, who, v, &chain("chain-A"), coins)?;
    store.commit(batch).unwrap();
    Ok(equivalent)
}

#[test]
fn scenario_expected_delegation_then_credit() {
    let ledger = ledger();
    let v1 = validator("vaaaaa");

    let expected = ledger
        .expected_delegation_amount(&Coin::new(denom("ibc/COINX"), 100))
        .unwrap();
    assert_eq!(expected, Coin::new(denom("ustake"), 50));

    ledger.credit(&v1, &chain("chain-A"), expected.amount).unwrap();
    assert_eq!(
        ledger.list_by_validator(&v1).unwrap(),
        vec![MultiStakingAgent {
            validator: v1.clone(),
            source: chain("chain-A"),
            equivalent_amount: 50,
        }]
    );
}

#[test]
fn credit_then_debit_restores_balance() {
    let ledger = ledger();
    let v = validator("vaaaaa");
    let src = chain("chain-A");
    ledger.credit(&v, &src, 300).unwrap();
    ledger.credit(&v, &src, 45).unwrap();
    ledger.debit(&v, &src, 45).unwrap();
    assert_eq!(ledger.balance(&v, &src).unwrap(), 300);
}

#[test]
fn over_debit_fails_without_mutation() {
    let ledger = ledger();
    let v = validator("vaaaaa");
    let src = chain("chain-A");
    ledger.credit(&v, &src, 10).unwrap();

    let err = ledger.debit(&v, &src, 11).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance {
            needed: 11,
            available: 10,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(ledger.balance(&v, &src).unwrap(), 10);
}

#[test]
fn debit_of_missing_row_is_insufficient() {
    let ledger = ledger();
    let v = validator("vaaaaa");
    let err = ledger.debit(&v, &chain("chain-A"), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert!(ledger.get_agent(&v, &chain("chain-A")).unwrap().is_none());
}

#[test]
fn rows_survive_at_zero() {
    let ledger = ledger();
    let v = validator("vaaaaa");
    let src = chain("chain-A");
    ledger.credit(&v, &src, 7).unwrap();
    ledger.debit(&v, &src, 7).unwrap();
    let row = ledger.get_agent(&v, &src).unwrap().unwrap();
    assert_eq!(row.equivalent_amount, 0);
}

#[test]
fn credit_overflow_is_rejected() {
    let ledger = ledger();
    let v = validator("vaaaaa");
    let src = chain("chain-A");
    ledger.credit(&v, &src, u128::MAX).unwrap();
    let err = ledger.credit(&v, &src, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arithmetic);
    assert_eq!(ledger.balance(&v, &src).unwrap(), u128::MAX);
}

#[test]
fn listing_is_key_ordered_and_per_validator() {
    let ledger = ledger();
    let v1 = validator("vaaaaa");
    let v2 = validator("vqqqqq");
    ledger.credit(&v1, &chain("chain-B"), 2).unwrap();
    ledger.credit(&v1, &AgentSource::Native, 1).unwrap();
    ledger.credit(&v1, &chain("chain-A"), 3).unwrap();
    ledger.credit(&v2, &chain("chain-A"), 9).unwrap();

    let sources: Vec<AgentSource> = ledger
        .list_by_validator(&v1)
        .unwrap()
        .into_iter()
        .map(|a| a.source)
        .collect();
    assert_eq!(sources, vec![AgentSource::Native, chain("chain-A"), chain("chain-B")]);
    assert_eq!(ledger.total_equivalent(&v1).unwrap(), 6);
    assert_eq!(ledger.list_all().unwrap().len(), 4);

    // Restartable: a second pass sees the same rows.
    assert_eq!(ledger.list_by_validator(&v1).unwrap().len(), 3);
}

#[test]
fn unsupported_denom_is_reported() {
    let ledger = ledger();
    let err = ledger
        .expected_delegation_amount(&Coin::new(denom("ibc/UNKNOWN"), 5))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Equivalence(_)));
}

#[test]
fn native_coin_converts_one_to_one() {
    let ledger = ledger();
    let coin = ledger
        .expected_delegation_amount(&Coin::new(denom("ustake"), 77))
        .unwrap();
    assert_eq!(coin.amount, 77);
}

#[test]
fn deposit_credits_agent_and_records_owner_share() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let dave = owner("dave00");
    deposit(&ledger, &store, &dave, &v, 100);
    deposit(&ledger, &store, &dave, &v, 40);

    assert_eq!(ledger.balance(&v, &chain("chain-A")).unwrap(), 70);
    assert_eq!(
        ledger.get_deposit(&dave, &v, &chain("chain-A")).unwrap(),
        Some(DepositRecord {
            owner: dave.clone(),
            validator: v.clone(),
            source: chain("chain-A"),
            coins: 140,
            equivalent_amount: 70,
        })
    );
    assert_eq!(ledger.deposits_of(&dave).unwrap().len(), 1);
}

#[test]
fn staged_changes_compose_within_one_batch() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let src = chain("chain-A");
    let mut batch = WriteBatch::new();
    ledger.stage_credit(&mut batch, &v, &src, 10).unwrap();
    ledger.stage_credit(&mut batch, &v, &src, 5).unwrap();
    ledger.stage_debit(&mut batch, &v, &src, 12).unwrap();
    assert!(ledger.get_agent(&v, &src).unwrap().is_none());

    store.commit(batch).unwrap();
    assert_eq!(ledger.balance(&v, &src).unwrap(), 3);
}

#[test]
fn redemption_without_deposit_is_rejected() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    deposit(&ledger, &store, &owner("dave00"), &v, 2);

    let err = redeem(&ledger, &store, &owner("mmmmmm"), &v, 3).unwrap_err();
    assert!(matches!(err, LedgerError::NoDeposit { .. }));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(ledger.balance(&v, &chain("chain-A")).unwrap(), 1);
}

#[test]
fn redemption_beyond_deposit_is_rejected() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let dave = owner("dave00");
    deposit(&ledger, &store, &dave, &v, 2);

    let err = redeem(&ledger, &store, &dave, &v, 3).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ExceedsDeposit {
            requested: 3,
            deposited: 2,
            ..
        }
    ));
    assert_eq!(ledger.get_deposit(&dave, &v, &chain("chain-A")).unwrap().unwrap().coins, 2);
}

#[test]
fn partial_redemption_rounds_the_charge_up() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let dave = owner("dave00");
    // 3 coins at 0.5 credit floor(1.5) = 1.
    deposit(&ledger, &store, &dave, &v, 3);
    assert_eq!(ledger.balance(&v, &chain("chain-A")).unwrap(), 1);

    // ceil(1 * 1 / 3) = 1: the first coin out carries the whole unit.
    assert_eq!(redeem(&ledger, &store, &dave, &v, 1).unwrap(), 1);
    // The remaining two coins carry nothing.
    assert_eq!(redeem(&ledger, &store, &dave, &v, 2).unwrap(), 0);
    assert!(ledger.get_deposit(&dave, &v, &chain("chain-A")).unwrap().is_none());
}

#[test]
fn redemptions_never_charge_more_than_was_credited() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let dave = owner("dave00");
    deposit(&ledger, &store, &dave, &v, 7);
    let credited = ledger.balance(&v, &chain("chain-A")).unwrap();
    assert_eq!(credited, 3);

    let charged: u128 = [2u128, 2, 2, 1]
        .iter()
        .map(|coins| redeem(&ledger, &store, &dave, &v, *coins).unwrap())
        .sum();
    assert_eq!(charged, credited);
    assert!(ledger.deposits_of(&dave).unwrap().is_empty());
}

#[test]
fn owners_redeem_only_their_own_share() {
    let (ledger, store) = ledger_with_store();
    let v = validator("vaaaaa");
    let dave = owner("dave00");
    let erin = owner("erqqqq");
    deposit(&ledger, &store, &dave, &v, 10);
    deposit(&ledger, &store, &erin, &v, 20);

    assert!(redeem(&ledger, &store, &dave, &v, 11).is_err());
    assert_eq!(redeem(&ledger, &store, &dave, &v, 10).unwrap(), 5);
    assert_eq!(
        ledger.get_deposit(&erin, &v, &chain("chain-A")).unwrap().unwrap().coins,
        20
    );
    assert_eq!(ledger.list_deposits().unwrap().len(), 1);
}
