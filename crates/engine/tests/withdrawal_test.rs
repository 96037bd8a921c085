//! Withdrawal workflow integration tests.

use mutuo_engine::{Engine, EngineError};
use mutuo_shared::EngineConfig;
use mutuo_shared::types::{Money, UserId};

fn engine_with_funded_user(balance: Money) -> (Engine, UserId) {
    let engine = Engine::new(EngineConfig::default());
    let user = UserId::new();
    engine.create_account(user, None).unwrap();
    let deposit = engine
        .create_deposit(user, balance, "UTR-FUND".to_string())
        .unwrap();
    engine.approve_deposit(deposit.id).unwrap();
    (engine, user)
}

#[test]
fn test_creation_debits_escrow() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(100_000));

    engine
        .create_withdrawal(user, Money::from_minor(30_000), "user@upi".to_string())
        .unwrap();

    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(70_000)
    );
    assert_eq!(engine.ledger_balance(user), Money::from_minor(70_000));
}

#[test]
fn test_insufficient_funds_creates_no_request() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(10_000));

    let result = engine.create_withdrawal(user, Money::from_minor(10_001), "user@upi".to_string());
    assert!(matches!(result, Err(EngineError::Ledger(_))));

    // No escrow left the wallet and no entry was written.
    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(10_000)
    );
    assert_eq!(engine.ledger_entries(user).len(), 1); // the funding deposit
}

#[test]
fn test_approval_leaves_balance_unchanged() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(50_000));
    let request = engine
        .create_withdrawal(user, Money::from_minor(20_000), "user@upi".to_string())
        .unwrap();

    let before = engine.account(user).unwrap().wallet_balance;
    engine.approve_withdrawal(request.id).unwrap();
    assert_eq!(engine.account(user).unwrap().wallet_balance, before);
}

#[test]
fn test_rejection_refunds_exact_amount() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(50_000));
    let request = engine
        .create_withdrawal(user, Money::from_minor(20_000), "user@upi".to_string())
        .unwrap();
    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(30_000)
    );

    engine.reject_withdrawal(request.id).unwrap();
    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(50_000)
    );
    assert_eq!(engine.ledger_balance(user), Money::from_minor(50_000));
}

#[test]
fn test_no_double_refund() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(50_000));
    let request = engine
        .create_withdrawal(user, Money::from_minor(20_000), "user@upi".to_string())
        .unwrap();
    engine.reject_withdrawal(request.id).unwrap();

    let result = engine.reject_withdrawal(request.id);
    assert!(matches!(result, Err(EngineError::Workflow(_))));
    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(50_000)
    );
}

#[test]
fn test_approve_after_reject_fails() {
    let (engine, user) = engine_with_funded_user(Money::from_minor(50_000));
    let request = engine
        .create_withdrawal(user, Money::from_minor(20_000), "user@upi".to_string())
        .unwrap();
    engine.reject_withdrawal(request.id).unwrap();
    assert!(engine.approve_withdrawal(request.id).is_err());
}
