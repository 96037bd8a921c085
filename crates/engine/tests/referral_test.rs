//! Referral bonus integration tests.

use mutuo_core::ledger::{AccountStatus, EntryKind};
use mutuo_core::schedule::DurationUnit;
use mutuo_core::workflow::RepaymentMethod;
use mutuo_engine::Engine;
use mutuo_shared::EngineConfig;
use mutuo_shared::types::{GroupPlanId, Money, UserId};

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
}

fn funded_user(engine: &Engine, balance: Money, referred_by: Option<UserId>) -> UserId {
    let user = UserId::new();
    engine.create_account(user, referred_by).unwrap();
    let deposit = engine
        .create_deposit(user, balance, "UTR-FUND".to_string())
        .unwrap();
    engine.approve_deposit(deposit.id).unwrap();
    user
}

fn open_plan(engine: &Engine) -> GroupPlanId {
    engine
        .create_group_plan(
            Money::from_major(100_000),
            Money::from_major(10_000),
            RepaymentMethod::Direct,
            6,
            DurationUnit::Months,
        )
        .unwrap()
        .id
}

#[test]
fn test_bonus_paid_exactly_once() {
    let engine = engine();
    let referrer = funded_user(&engine, Money::from_major(100), None);
    let referred = funded_user(&engine, Money::from_major(5_000), Some(referrer));
    let plan_id = open_plan(&engine);

    let bonus = Money::from_minor(engine.config().referral_bonus_minor);
    let referrer_before = engine.account(referrer).unwrap().wallet_balance;

    engine
        .invest_in_group_loan(plan_id, referred, Money::from_major(1_000))
        .unwrap();
    assert_eq!(
        engine.account(referrer).unwrap().wallet_balance,
        referrer_before + bonus
    );
    assert!(engine.account(referred).unwrap().referral_bonus_paid);

    // A second investment pays nothing further.
    engine
        .invest_in_group_loan(plan_id, referred, Money::from_major(1_000))
        .unwrap();
    assert_eq!(
        engine.account(referrer).unwrap().wallet_balance,
        referrer_before + bonus
    );

    let bonus_entries: Vec<_> = engine
        .ledger_entries(referrer)
        .into_iter()
        .filter(|e| e.kind == EntryKind::ReferralBonus)
        .collect();
    assert_eq!(bonus_entries.len(), 1);
    assert_eq!(bonus_entries[0].amount, bonus);
}

#[test]
fn test_no_bonus_without_referrer() {
    let engine = engine();
    let investor = funded_user(&engine, Money::from_major(5_000), None);
    let plan_id = open_plan(&engine);

    engine
        .invest_in_group_loan(plan_id, investor, Money::from_major(1_000))
        .unwrap();
    assert!(!engine.account(investor).unwrap().referral_bonus_paid);
}

#[test]
fn test_blocked_referrer_skips_bonus_but_investment_succeeds() {
    let engine = engine();
    let referrer = funded_user(&engine, Money::from_major(100), None);
    let referred = funded_user(&engine, Money::from_major(5_000), Some(referrer));
    engine
        .set_account_status(referrer, AccountStatus::Blocked)
        .unwrap();
    let plan_id = open_plan(&engine);

    let plan = engine
        .invest_in_group_loan(plan_id, referred, Money::from_major(1_000))
        .unwrap();
    assert_eq!(plan.amount_funded, Money::from_major(1_000));

    // No bonus, and the marker stays unset.
    assert_eq!(
        engine.account(referrer).unwrap().wallet_balance,
        Money::from_major(100)
    );
    assert!(!engine.account(referred).unwrap().referral_bonus_paid);
}

#[test]
fn test_referrer_income_tracked() {
    let engine = engine();
    let referrer = funded_user(&engine, Money::from_major(100), None);
    let referred = funded_user(&engine, Money::from_major(5_000), Some(referrer));
    let plan_id = open_plan(&engine);

    engine
        .invest_in_group_loan(plan_id, referred, Money::from_major(1_000))
        .unwrap();

    let bonus = Money::from_minor(engine.config().referral_bonus_minor);
    assert_eq!(engine.account(referrer).unwrap().total_income, bonus);
    assert_eq!(
        engine.ledger_balance(referrer),
        engine.account(referrer).unwrap().wallet_balance
    );
}
