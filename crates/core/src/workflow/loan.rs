//! Loan plans, loan requests, and active loans.
//!
//! A request travels pending → approved → sent (or pending → rejected).
//! Approval opens an [`ActiveLoan`] whose due date and EMI schedule come
//! from the plan. Repayments accumulate against `total_payable`; the
//! loan completes exactly when they meet it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mutuo_shared::types::{LoanId, LoanPlanId, LoanRequestId, Money, UserId};

use super::error::WorkflowError;
use crate::schedule::{self, DurationUnit, ScheduleError};

/// How a loan is repaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentMethod {
    /// Fixed installments on a recurring schedule.
    Emi,
    /// One payment of the full amount.
    Direct,
}

impl RepaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emi => "emi",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a loan request.
///
/// Valid transitions:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
/// - Approved → Sent (disbursement confirmed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanRequestStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved; the active loan exists, disbursement outstanding.
    Approved,
    /// Disbursement confirmed; terminal.
    Sent,
    /// Rejected; terminal.
    Rejected,
}

impl LoanRequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Sent => "sent",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for LoanRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an active loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Running, inside its term.
    Active,
    /// Past its due date with nothing received since.
    Due,
    /// Past due and partially paid.
    PaymentPending,
    /// Fully repaid; terminal.
    Completed,
}

impl LoanStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Due => "due",
            Self::PaymentPending => "payment_pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single EMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmiStatus {
    /// Not yet covered by payments.
    Pending,
    /// Fully covered by payments.
    Paid,
}

/// One installment of an EMI schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emi {
    /// Installment amount.
    pub amount: Money,
    /// When the installment falls due.
    pub due_date: DateTime<Utc>,
    /// Whether payments have covered it.
    pub status: EmiStatus,
}

/// Static loan plan configuration.
///
/// Immutable once loans reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPlan {
    /// Unique identifier.
    pub id: LoanPlanId,
    /// Principal offered.
    pub loan_amount: Money,
    /// Interest charged over the term.
    pub interest: Money,
    /// Tax charged over the term.
    pub tax: Money,
    /// Principal + interest + tax.
    pub total_repayment: Money,
    /// Term length in `duration_unit`s.
    pub duration: u32,
    /// Calendar unit of the term.
    pub duration_unit: DurationUnit,
    /// Whether EMI repayment is offered.
    pub emi_allowed: bool,
    /// Whether direct (lump-sum) repayment is offered.
    pub direct_allowed: bool,
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
}

impl LoanPlan {
    /// Creates a plan, deriving `total_repayment`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive principal or negative
    /// interest/tax, and `InvalidDuration` for a zero-length term.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        loan_amount: Money,
        interest: Money,
        tax: Money,
        duration: u32,
        duration_unit: DurationUnit,
        emi_allowed: bool,
        direct_allowed: bool,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !loan_amount.is_positive() || interest.is_negative() || tax.is_negative() {
            return Err(WorkflowError::InvalidAmount);
        }
        if duration == 0 {
            return Err(ScheduleError::InvalidDuration.into());
        }
        Ok(Self {
            id: LoanPlanId::new(),
            loan_amount,
            interest,
            tax,
            total_repayment: loan_amount + interest + tax,
            duration,
            duration_unit,
            emi_allowed,
            direct_allowed,
            created_at: at,
        })
    }

    /// Returns true if the plan offers the given repayment method.
    #[must_use]
    pub const fn offers(&self, method: RepaymentMethod) -> bool {
        match method {
            RepaymentMethod::Emi => self.emi_allowed,
            RepaymentMethod::Direct => self.direct_allowed,
        }
    }
}

/// A user's application for a loan plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Unique identifier.
    pub id: LoanRequestId,
    /// The applying user.
    pub user_id: UserId,
    /// The plan applied for.
    pub plan_id: LoanPlanId,
    /// The chosen repayment method.
    pub method: RepaymentMethod,
    /// Request status.
    pub status: LoanRequestStatus,
    /// Why the request was rejected, if it was.
    pub rejection_reason: Option<String>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the admin decided, if decided.
    pub decided_at: Option<DateTime<Utc>>,
}

impl LoanRequest {
    /// Creates a new pending request against a plan.
    ///
    /// An EMI request on a day-denominated plan is rejected here, at
    /// submission, rather than producing an empty schedule later.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotOffered` or `EmiUnsupportedForDays`.
    pub fn new(
        user_id: UserId,
        plan: &LoanPlan,
        method: RepaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !plan.offers(method) {
            return Err(WorkflowError::MethodNotOffered {
                method: method.as_str(),
            });
        }
        if method == RepaymentMethod::Emi {
            schedule::emi_count(plan.duration, plan.duration_unit)?;
        }
        Ok(Self {
            id: LoanRequestId::new(),
            user_id,
            plan_id: plan.id,
            method,
            status: LoanRequestStatus::Pending,
            rejection_reason: None,
            created_at: at,
            decided_at: None,
        })
    }

    /// Approves a pending request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is pending.
    pub fn approve(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if self.status != LoanRequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: "loan request",
                from: self.status.as_str(),
                to: LoanRequestStatus::Approved.as_str(),
            });
        }
        self.status = LoanRequestStatus::Approved;
        self.decided_at = Some(at);
        Ok(self)
    }

    /// Rejects a pending request with a reason.
    ///
    /// # Errors
    ///
    /// Returns `RejectionReasonRequired` for an empty reason and
    /// `InvalidTransition` unless the request is pending.
    pub fn reject(mut self, reason: String, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if reason.trim().is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }
        if self.status != LoanRequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: "loan request",
                from: self.status.as_str(),
                to: LoanRequestStatus::Rejected.as_str(),
            });
        }
        self.status = LoanRequestStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.decided_at = Some(at);
        Ok(self)
    }

    /// Confirms that the principal was disbursed to the borrower.
    ///
    /// Disbursement happens outside the wallet, so this moves no funds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is approved.
    pub fn mark_sent(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if self.status != LoanRequestStatus::Approved {
            return Err(WorkflowError::InvalidTransition {
                entity: "loan request",
                from: self.status.as_str(),
                to: LoanRequestStatus::Sent.as_str(),
            });
        }
        self.status = LoanRequestStatus::Sent;
        self.decided_at = Some(at);
        Ok(self)
    }
}

/// A running loan opened from an approved request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveLoan {
    /// Unique identifier.
    pub id: LoanId,
    /// The borrowing user.
    pub user_id: UserId,
    /// The plan the loan runs on.
    pub plan_id: LoanPlanId,
    /// The request this loan was opened from.
    pub request_id: LoanRequestId,
    /// Principal disbursed.
    pub loan_amount: Money,
    /// Total the borrower owes over the term.
    pub total_payable: Money,
    /// When the term started.
    pub start_date: DateTime<Utc>,
    /// When the full amount falls due.
    pub due_date: DateTime<Utc>,
    /// Loan status.
    pub status: LoanStatus,
    /// Repayments received so far.
    pub amount_paid: Money,
    /// EMI schedule; empty for direct repayment.
    pub emis: Vec<Emi>,
}

impl ActiveLoan {
    /// Opens a loan from an approved request.
    ///
    /// # Errors
    ///
    /// Propagates schedule errors (due date overflow, EMI cadence).
    pub fn open(
        request: &LoanRequest,
        plan: &LoanPlan,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        let due_date = schedule::advance(at, plan.duration, plan.duration_unit)?;
        let emis = match request.method {
            RepaymentMethod::Direct => Vec::new(),
            RepaymentMethod::Emi => {
                schedule::emi_schedule(plan.total_repayment, plan.duration, plan.duration_unit, at)?
                    .into_iter()
                    .map(|(amount, due_date)| Emi {
                        amount,
                        due_date,
                        status: EmiStatus::Pending,
                    })
                    .collect()
            }
        };
        Ok(Self {
            id: LoanId::new(),
            user_id: request.user_id,
            plan_id: plan.id,
            request_id: request.id,
            loan_amount: plan.loan_amount,
            total_payable: plan.total_repayment,
            start_date: at,
            due_date,
            status: LoanStatus::Active,
            amount_paid: Money::ZERO,
            emis,
        })
    }

    /// What the borrower still owes.
    #[must_use]
    pub fn remaining(&self) -> Money {
        self.total_payable - self.amount_paid
    }

    /// Records a repayment.
    ///
    /// EMIs are marked paid oldest-first as the cumulative amount paid
    /// covers them in full. The loan completes exactly when
    /// `amount_paid` reaches `total_payable`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts,
    /// `InvalidTransition` on a completed loan, and `ExceedsRemaining`
    /// if the payment overshoots what is owed.
    pub fn record_payment(mut self, amount: Money) -> Result<Self, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if self.status == LoanStatus::Completed {
            return Err(WorkflowError::InvalidTransition {
                entity: "loan",
                from: self.status.as_str(),
                to: LoanStatus::Completed.as_str(),
            });
        }
        if amount > self.remaining() {
            return Err(WorkflowError::ExceedsRemaining {
                requested: amount,
                remaining: self.remaining(),
            });
        }

        self.amount_paid += amount;

        let mut covered = Money::ZERO;
        for emi in &mut self.emis {
            covered += emi.amount;
            if covered <= self.amount_paid {
                emi.status = EmiStatus::Paid;
            }
        }

        if self.amount_paid == self.total_payable {
            self.status = LoanStatus::Completed;
        } else if self.status == LoanStatus::Due {
            self.status = LoanStatus::PaymentPending;
        }
        Ok(self)
    }

    /// Flags a running loan whose due date has passed.
    ///
    /// # Errors
    ///
    /// Returns `NotYetDue` before the due date and `InvalidTransition`
    /// unless the loan is active.
    pub fn mark_due(mut self, now: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if self.status != LoanStatus::Active {
            return Err(WorkflowError::InvalidTransition {
                entity: "loan",
                from: self.status.as_str(),
                to: LoanStatus::Due.as_str(),
            });
        }
        if now <= self.due_date {
            return Err(WorkflowError::NotYetDue);
        }
        self.status = LoanStatus::Due;
        Ok(self)
    }
}
