//! Unbonding queue and end-of-block sweep over nullable collaborators.

use std::sync::Arc;

use interstake_equivalence::{EquivalenceCalculator, StaticRateTable};
use interstake_multistaking::{AgentLedger, AgentSource, LedgerError};
use interstake_nullables::NullStore;
use interstake_store::{BatchStore, WriteBatch};
use interstake_types::{
    Address, BlockContext, ChainId, Coin, Dec, Denom, ErrorKind, Timestamp, ValidatorAddress,
};
use interstake_unbonding::{Bank, BankError, EntryState, StoreBank, UnbondingError, UnbondingQueue};

const UNBONDING_TIME: u64 = 100;

struct Harness {
    store: Arc<NullStore>,
    bank: Arc<StoreBank>,
    ledger: Arc<AgentLedger>,
    queue: UnbondingQueue,
}

impl Harness {
    /// Mint `coins` to `who`, move them into the module account and record
    /// the deposit with `validator`, the way the app's deposit handler does.
    fn deposit_to(&self, who: &Address, validator: &ValidatorAddress, coins: u128) {
        self.bank.mint(who, &voucher(coins)).unwrap();
        let equivalent = self
            .ledger
            .expected_delegation_amount(&voucher(coins))
            .unwrap()
            .amount;
        let mut batch = WriteBatch::new();
        self.bank
            .stage_transfer(&mut batch, who, &module_account(), &voucher(coins))
            .unwrap();
        self.ledger
            .stage_deposit(&mut batch, who, validator, &source(), coins, equivalent)
            .unwrap();
        self.store.commit(batch).unwrap();
    }

    fn deposit(&self, who: &Address, coins: u128) {
        self.deposit_to(who, &validator(), coins);
    }

    fn unbond(
        &self,
        who: &Address,
        coins: u128,
        ctx: BlockContext,
    ) -> Result<interstake_unbonding::UnbondingEntry, UnbondingError> {
        self.queue
            .redeem(who, &validator(), &source(), &voucher(coins), ctx)
    }

    fn held(&self, who: &Address) -> u128 {
        self.bank.balance(who, &voucher(0).denom).unwrap()
    }

    fn agent(&self) -> u128 {
        self.ledger.balance(&validator(), &source()).unwrap()
    }
}

fn module_account() -> Address {
    Address::parse("istake1mmmmmmmm").unwrap()
}

fn owner(data: &str) -> Address {
    Address::parse(format!("istake1{data}")).unwrap()
}

fn validator() -> ValidatorAddress {
    ValidatorAddress::parse("istakevaloper1vaaaaa").unwrap()
}

fn source() -> AgentSource {
    AgentSource::Chain(ChainId::parse("chain-A").unwrap())
}

fn voucher(amount: u128) -> Coin {
    Coin::new(Denom::parse("ibc/COINX").unwrap(), amount)
}

fn at(height: u64, secs: u64) -> BlockContext {
    BlockContext::new(height, Timestamp::new(secs))
}

fn harness() -> Harness {
    let store = Arc::new(NullStore::new());
    let rates = StaticRateTable::new().with_rate(voucher(0).denom, "0.5".parse::<Dec>().unwrap());
    let ledger = Arc::new(AgentLedger::new(
        store.clone(),
        store.clone(),
        EquivalenceCalculator::new(Arc::new(rates)),
        Denom::parse("ustake").unwrap(),
    ));
    let bank = Arc::new(StoreBank::new(store.clone(), store.clone()));
    let queue = UnbondingQueue::new(
        store.clone(),
        store.clone(),
        ledger.clone(),
        bank.clone(),
        module_account(),
        UNBONDING_TIME,
    );
    Harness {
        store,
        bank,
        ledger,
        queue,
    }
}

#[test]
fn redeem_sets_completion_time_and_sequence() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 200);

    let first = h.unbond(&dave, 20, at(5, 1_000)).unwrap();
    let second = h.unbond(&dave, 20, at(6, 1_005)).unwrap();

    assert_eq!(first.completion_time, Timestamp::new(1_000 + UNBONDING_TIME));
    assert_eq!(first.creation_height, 5);
    assert_eq!(first.equivalent_amount, 10);
    assert!(second.sequence > first.sequence);
    assert_eq!(h.queue.pending_for(&validator(), &source()).unwrap(), 20);
    assert_eq!(h.queue.pending_count().unwrap(), 2);

    // Queued coins are reserved out of the deposit record.
    let record = h.ledger.get_deposit(&dave, &validator(), &source()).unwrap().unwrap();
    assert_eq!((record.coins, record.equivalent_amount), (160, 80));
}

#[test]
fn over_commit_is_rejected() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 60);
    // Stake removed behind the queue's back.
    h.ledger.debit(&validator(), &source(), 15).unwrap();
    h.unbond(&dave, 20, at(1, 0)).unwrap();

    let err = h.unbond(&dave, 12, at(2, 0)).unwrap_err();
    assert!(matches!(
        err,
        UnbondingError::OverCommitted {
            requested: 6,
            free: 5,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(h.queue.pending_count().unwrap(), 1);
    let record = h.ledger.get_deposit(&dave, &validator(), &source()).unwrap().unwrap();
    assert_eq!(record.coins, 40);
}

#[test]
fn zero_amount_is_rejected() {
    let h = harness();
    h.deposit(&owner("dave00"), 30);
    let err = h.unbond(&owner("dave00"), 0, at(1, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn only_depositors_can_unbond_and_only_what_they_put_in() {
    let h = harness();
    let dave = owner("dave00");
    let mallory = owner("mmmmmm");
    let erin = owner("erqqqq");
    let other_validator = ValidatorAddress::parse("istakevaloper1vccccc").unwrap();
    h.deposit(&dave, 2);
    h.deposit_to(&erin, &other_validator, 10);
    assert_eq!(h.held(&module_account()), 12);

    let err = h.unbond(&mallory, 3, at(1, 0)).unwrap_err();
    assert!(matches!(
        err,
        UnbondingError::Ledger(LedgerError::NoDeposit { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);

    let err = h.unbond(&dave, 3, at(1, 0)).unwrap_err();
    assert!(matches!(
        err,
        UnbondingError::Ledger(LedgerError::ExceedsDeposit {
            requested: 3,
            deposited: 2,
            ..
        })
    ));
    assert_eq!(h.queue.pending_count().unwrap(), 0);

    // Both real depositors get everything back; the module account ends at zero.
    h.unbond(&dave, 2, at(1, 0)).unwrap();
    h.queue
        .redeem(&erin, &other_validator, &source(), &voucher(10), at(1, 0))
        .unwrap();
    let report = h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert_eq!(report.settled.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(h.held(&dave), 2);
    assert_eq!(h.held(&erin), 10);
    assert_eq!(h.held(&mallory), 0);
    assert_eq!(h.held(&module_account()), 0);
}

#[test]
fn unbonding_at_a_fractional_rate_charges_the_agent_exactly_once() {
    let h = harness();
    let dave = owner("dave00");
    // 3 coins at 0.5 credit one unit of stake.
    h.deposit(&dave, 3);
    assert_eq!(h.agent(), 1);

    let first = h.unbond(&dave, 1, at(1, 0)).unwrap();
    let rest = h.unbond(&dave, 2, at(1, 0)).unwrap();
    assert_eq!(first.equivalent_amount, 1);
    assert_eq!(rest.equivalent_amount, 0);
    assert!(h.unbond(&dave, 1, at(1, 0)).is_err());

    h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert_eq!(h.agent(), 0);
    assert_eq!(h.held(&dave), 3);
    assert_eq!(h.held(&module_account()), 0);
}

#[test]
fn entries_settle_in_completion_order_regardless_of_insertion() {
    let h = harness();
    h.deposit(&owner("late00"), 14);
    h.deposit(&owner("early0"), 6);

    // Later completion inserted first.
    let late = h.unbond(&owner("late00"), 14, at(1, 500)).unwrap();
    let early = h.unbond(&owner("early0"), 6, at(2, 200)).unwrap();
    assert!(early.completion_time < late.completion_time);

    // Before the earlier completion time nothing settles.
    let report = h.queue.end_block(at(3, 200 + UNBONDING_TIME - 1)).unwrap();
    assert!(report.is_empty());
    assert_eq!(h.agent(), 10);

    // Both due at once: settle earliest first.
    let report = h.queue.end_block(at(4, 500 + UNBONDING_TIME)).unwrap();
    let owners: Vec<Address> = report.settled.iter().map(|e| e.owner.clone()).collect();
    assert_eq!(owners, vec![owner("early0"), owner("late00")]);
    assert!(report.failed.is_empty());
    assert_eq!(h.agent(), 0);
    assert_eq!(h.queue.pending_count().unwrap(), 0);
}

#[test]
fn same_completion_time_settles_in_insertion_order() {
    let h = harness();
    for data in ["aaaaaa", "cccccc", "qqqqqq"] {
        h.deposit(&owner(data), 2);
        h.unbond(&owner(data), 2, at(1, 0)).unwrap();
    }
    let report = h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    let owners: Vec<Address> = report.settled.iter().map(|e| e.owner.clone()).collect();
    assert_eq!(owners, vec![owner("aaaaaa"), owner("cccccc"), owner("qqqqqq")]);
}

#[test]
fn settlement_returns_coins_from_the_module_account() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 20);
    assert_eq!(h.held(&dave), 0);

    h.unbond(&dave, 20, at(1, 0)).unwrap();
    h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert_eq!(h.held(&dave), 20);
    assert_eq!(h.held(&module_account()), 0);
    assert!(h.ledger.deposits_of(&dave).unwrap().is_empty());
}

#[test]
fn blocked_recipient_keeps_entry_while_others_settle() {
    let h = harness();
    let blocked = owner("qqqqqq");
    for data in ["aaaaaa", "qqqqqq", "cccccc"] {
        h.deposit(&owner(data), 100);
    }
    let good = h.unbond(&owner("aaaaaa"), 20, at(1, 0)).unwrap();
    let stuck = h.unbond(&blocked, 40, at(1, 0)).unwrap();
    let also_good = h.unbond(&owner("cccccc"), 60, at(1, 0)).unwrap();
    h.bank.block(&blocked);

    let now = at(2, UNBONDING_TIME);
    let report = h.queue.end_block(now).unwrap();
    let settled: Vec<u64> = report.settled.iter().map(|e| e.sequence).collect();
    assert_eq!(settled, vec![good.sequence, also_good.sequence]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, stuck.key());
    assert_eq!(report.failed[0].kind, ErrorKind::ExternalTransportFailure);

    // Nothing of the failed entry was written.
    assert_eq!(h.agent(), 150 - 10 - 30);
    assert_eq!(h.held(&blocked), 0);
    assert_eq!(h.held(&module_account()), 300 - 20 - 60);
    assert_eq!(
        h.queue.entry_state(&stuck.key(), now.time).unwrap(),
        EntryState::Matured
    );

    // Retried on the next block once the bank accepts it.
    h.bank.unblock(&blocked);
    let report = h.queue.end_block(at(3, UNBONDING_TIME + 5)).unwrap();
    assert_eq!(report.settled.len(), 1);
    assert_eq!(h.agent(), 90);
    assert_eq!(h.held(&blocked), 40);
    assert_eq!(
        h.queue.entry_state(&stuck.key(), now.time).unwrap(),
        EntryState::Settled
    );
}

#[test]
fn failed_commit_leaves_agent_queue_and_balances_untouched() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 40);
    let entry = h.unbond(&dave, 40, at(1, 0)).unwrap();

    h.store.fail_commits(true);
    let report = h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert!(report.settled.is_empty());
    assert_eq!(report.failed[0].kind, ErrorKind::Storage);
    assert_eq!(h.agent(), 20);
    assert_eq!(h.held(&dave), 0);
    assert_eq!(h.held(&module_account()), 40);
    assert_eq!(h.queue.list_pending().unwrap(), vec![entry]);

    h.store.fail_commits(false);
    let report = h.queue.end_block(at(3, UNBONDING_TIME + 1)).unwrap();
    assert_eq!(report.settled.len(), 1);
    assert_eq!(h.agent(), 0);
    assert_eq!(h.held(&dave), 40);
}

#[test]
fn failed_request_commit_keeps_the_deposit() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 40);

    h.store.fail_commits(true);
    let err = h.unbond(&dave, 10, at(1, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    h.store.fail_commits(false);

    assert_eq!(h.queue.pending_count().unwrap(), 0);
    let record = h.ledger.get_deposit(&dave, &validator(), &source()).unwrap().unwrap();
    assert_eq!(record.coins, 40);
}

#[test]
fn insufficient_agent_stake_fails_entry() {
    let h = harness();
    let dave = owner("dave00");
    h.deposit(&dave, 20);
    let entry = h.unbond(&dave, 20, at(1, 0)).unwrap();
    // Stake removed behind the queue's back.
    h.ledger.debit(&validator(), &source(), 5).unwrap();

    let report = h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert!(report.settled.is_empty());
    assert_eq!(report.failed[0].kind, ErrorKind::InsufficientBalance);
    assert_eq!(h.agent(), 5);
    assert_eq!(h.held(&module_account()), 20);
    assert_eq!(h.queue.list_pending().unwrap(), vec![entry]);
}

#[test]
fn entry_state_follows_block_time() {
    let h = harness();
    h.deposit(&owner("dave00"), 20);
    let entry = h.unbond(&owner("dave00"), 2, at(1, 0)).unwrap();
    let key = entry.key();

    assert_eq!(
        h.queue.entry_state(&key, Timestamp::new(UNBONDING_TIME - 1)).unwrap(),
        EntryState::Pending
    );
    assert_eq!(
        h.queue.entry_state(&key, Timestamp::new(UNBONDING_TIME)).unwrap(),
        EntryState::Matured
    );
    h.queue.end_block(at(2, UNBONDING_TIME)).unwrap();
    assert_eq!(
        h.queue.entry_state(&key, Timestamp::new(UNBONDING_TIME)).unwrap(),
        EntryState::Settled
    );
}

#[test]
fn entries_settle_exactly_once() {
    let h = harness();
    h.deposit(&owner("dave00"), 20);
    h.unbond(&owner("dave00"), 8, at(1, 0)).unwrap();
    assert_eq!(h.queue.end_block(at(2, UNBONDING_TIME)).unwrap().settled.len(), 1);
    assert!(h.queue.end_block(at(3, UNBONDING_TIME + 1)).unwrap().is_empty());
    assert_eq!(h.agent(), 6);
    assert_eq!(h.held(&owner("dave00")), 8);
}

#[test]
fn store_bank_moves_balances_and_opens_accounts() {
    let store = Arc::new(NullStore::new());
    let bank = StoreBank::new(store.clone(), store.clone());
    let dave = owner("dave00");
    let erin = owner("erqqqq");
    bank.mint(&dave, &voucher(50)).unwrap();
    assert!(!bank.has_account(&erin).unwrap());

    let mut batch = WriteBatch::new();
    bank.stage_transfer(&mut batch, &dave, &erin, &voucher(20)).unwrap();
    // Read-your-writes: the second leg sees the first.
    bank.stage_transfer(&mut batch, &dave, &erin, &voucher(20)).unwrap();
    let err = bank
        .stage_transfer(&mut batch, &dave, &erin, &voucher(11))
        .unwrap_err();
    assert!(matches!(err, BankError::InsufficientFunds { available: 10, .. }));
    assert_eq!(bank.balance(&dave, &voucher(0).denom).unwrap(), 50);

    store.commit(batch).unwrap();
    assert!(bank.has_account(&erin).unwrap());
    assert_eq!(bank.balance(&dave, &voucher(0).denom).unwrap(), 10);
    assert_eq!(bank.balance(&erin, &voucher(0).denom).unwrap(), 40);
}

#[test]
fn store_bank_refuses_blocked_recipients() {
    let store = Arc::new(NullStore::new());
    let bank = StoreBank::new(store.clone(), store.clone());
    let dave = owner("dave00");
    bank.mint(&dave, &voucher(5)).unwrap();
    bank.block(&module_account());

    let mut batch = WriteBatch::new();
    let err = bank
        .stage_transfer(&mut batch, &dave, &module_account(), &voucher(5))
        .unwrap_err();
    assert!(matches!(err, BankError::Blocked(_)));
    assert!(batch.is_empty());
    assert!(bank.is_blocked(&module_account()));
}
