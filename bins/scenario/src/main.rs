//! Scripted end-to-end scenario for Mutuo development.
//!
//! Seeds accounts and plans, then drives a deposit → withdrawal → loan
//! → group loan → coupon flow against an in-process engine, logging
//! every transition and the final balances.
//!
//! Usage: cargo run --bin scenario

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mutuo_core::schedule::DurationUnit;
use mutuo_core::workflow::RepaymentMethod;
use mutuo_engine::Engine;
use mutuo_shared::EngineConfig;
use mutuo_shared::types::{Money, UserId};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mutuo=debug,scenario=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = EngineConfig::load().unwrap_or_else(|err| {
        info!(error = %err, "no configuration found, using defaults");
        EngineConfig::default()
    });
    info!(currency = %config.currency, "engine configured");
    let engine = Engine::new(config);

    // Seed three users; Bina was referred by Arjun.
    let arjun = UserId::new();
    let bina = UserId::new();
    let chandra = UserId::new();
    engine.create_account(arjun, None)?;
    engine.create_account(bina, Some(arjun))?;
    engine.create_account(chandra, None)?;
    info!(%arjun, %bina, %chandra, "accounts seeded");

    // Deposits fund the wallets.
    for (user, amount, utr) in [
        (arjun, Money::from_major(5_000), "UTR-ARJ-1"),
        (bina, Money::from_major(20_000), "UTR-BIN-1"),
        (chandra, Money::from_major(3_000), "UTR-CHA-1"),
    ] {
        let deposit = engine.create_deposit(user, amount, utr.to_string())?;
        engine.approve_deposit(deposit.id)?;
    }

    // A withdrawal that gets rejected refunds its escrow.
    let withdrawal =
        engine.create_withdrawal(arjun, Money::from_major(500), "arjun@upi".to_string())?;
    engine.reject_withdrawal(withdrawal.id)?;

    // Chandra takes a 3-month EMI loan and repays the first installment.
    let plan = engine.create_loan_plan(
        Money::from_major(1_000),
        Money::from_major(100),
        Money::ZERO,
        3,
        DurationUnit::Months,
        true,
        true,
    )?;
    let request = engine.submit_loan_request(chandra, plan.id, RepaymentMethod::Emi)?;
    let loan = engine.approve_loan_request(request.id)?;
    engine.mark_loan_sent(request.id)?;
    let first_emi = loan.emis[0].amount;
    engine.record_loan_payment(chandra, loan.id, first_emi)?;

    // Bina's first investment fills a group plan and pays Arjun's
    // referral bonus; a borrower repayment is then distributed back.
    let group = engine.create_group_plan(
        Money::from_major(10_000),
        Money::from_major(1_000),
        RepaymentMethod::Direct,
        6,
        DurationUnit::Months,
    )?;
    engine.invest_in_group_loan(group.id, bina, Money::from_major(10_000))?;
    engine.record_group_repayment(group.id, Money::from_major(4_000))?;
    engine.distribute_group_payout(group.id, bina, Money::from_major(4_000))?;

    // A coupon everyone redeems once.
    engine.create_coupon("LAUNCH100".to_string(), Money::from_major(100), 3)?;
    for user in [arjun, bina, chandra] {
        engine.redeem_coupon("LAUNCH100", user)?;
    }

    for (name, user) in [("arjun", arjun), ("bina", bina), ("chandra", chandra)] {
        let account = engine.account(user)?;
        info!(
            user = name,
            wallet = %account.wallet_balance,
            ledger = %engine.ledger_balance(user),
            income = %account.total_income,
            invested = %account.total_investment,
            "final balances"
        );
    }

    info!("scenario complete");
    Ok(())
}
