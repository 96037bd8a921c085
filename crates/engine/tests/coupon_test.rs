//! Coupon redemption integration tests.

use mutuo_core::workflow::CouponStatus;
use mutuo_engine::{Engine, EngineError};
use mutuo_shared::EngineConfig;
use mutuo_shared::types::{Money, UserId};

fn engine() -> Engine {
    Engine::new(EngineConfig::default())
}

fn user(engine: &Engine) -> UserId {
    let user = UserId::new();
    engine.create_account(user, None).unwrap();
    user
}

#[test]
fn test_redemption_credits_wallet() {
    let engine = engine();
    let user = user(&engine);
    engine
        .create_coupon("WELCOME50".to_string(), Money::from_minor(5_000), 10)
        .unwrap();

    engine.redeem_coupon("WELCOME50", user).unwrap();

    let account = engine.account(user).unwrap();
    assert_eq!(account.wallet_balance, Money::from_minor(5_000));
    assert_eq!(account.total_income, Money::from_minor(5_000));
    assert_eq!(engine.ledger_balance(user), Money::from_minor(5_000));
}

#[test]
fn test_same_user_cannot_redeem_twice() {
    let engine = engine();
    let user = user(&engine);
    engine
        .create_coupon("ONCE".to_string(), Money::from_minor(1_000), 5)
        .unwrap();

    engine.redeem_coupon("ONCE", user).unwrap();
    let result = engine.redeem_coupon("ONCE", user);
    assert!(matches!(result, Err(EngineError::Workflow(_))));

    // The balance moved exactly once.
    assert_eq!(
        engine.account(user).unwrap().wallet_balance,
        Money::from_minor(1_000)
    );
}

#[test]
fn test_max_stock_depletes_and_rejects_overflow() {
    let engine = engine();
    engine
        .create_coupon("LIMIT2".to_string(), Money::from_minor(500), 2)
        .unwrap();

    engine.redeem_coupon("LIMIT2", user(&engine)).unwrap();
    let coupon = engine.redeem_coupon("LIMIT2", user(&engine)).unwrap();
    assert_eq!(coupon.status, CouponStatus::Depleted);

    let result = engine.redeem_coupon("LIMIT2", user(&engine));
    assert!(matches!(result, Err(EngineError::Workflow(_))));
}

#[test]
fn test_duplicate_code_rejected() {
    let engine = engine();
    engine
        .create_coupon("DUP".to_string(), Money::from_minor(100), 1)
        .unwrap();
    let result = engine.create_coupon("DUP".to_string(), Money::from_minor(200), 1);
    assert!(matches!(result, Err(EngineError::Store(_))));
}

#[test]
fn test_unknown_code_not_found() {
    let engine = engine();
    let user = user(&engine);
    let result = engine.redeem_coupon("NOPE", user);
    assert!(matches!(result, Err(EngineError::Store(_))));
}
