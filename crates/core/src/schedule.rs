//! Due dates and EMI schedule generation.
//!
//! A plan's duration is a count of calendar units. The overall due date
//! advances the start by the full duration; EMI schedules charge one
//! installment per period (monthly for month- and year-denominated
//! plans, weekly for week-denominated ones). Day-denominated plans have
//! no installment cadence and reject EMI outright.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mutuo_shared::types::Money;

use crate::allocation::split_equal;

/// Calendar unit a plan duration is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Calendar days.
    Days,
    /// Calendar weeks.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl DurationUnit {
    /// Returns the string representation of the unit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from schedule computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// EMI has no defined cadence for day-denominated plans.
    #[error("EMI repayment is not available for day-denominated plans")]
    EmiUnsupportedForDays,

    /// A plan duration must cover at least one period.
    #[error("Duration must be at least one period")]
    InvalidDuration,

    /// Date arithmetic left the representable calendar range.
    #[error("Due date computation overflowed the calendar")]
    DateOverflow,
}

impl ScheduleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmiUnsupportedForDays => "EMI_UNSUPPORTED_FOR_DAYS",
            Self::InvalidDuration => "INVALID_DURATION",
            Self::DateOverflow => "DATE_OVERFLOW",
        }
    }
}

/// Advances a timestamp by `count` units.
///
/// # Errors
///
/// Returns `DateOverflow` if the result leaves the representable range.
pub fn advance(
    start: DateTime<Utc>,
    count: u32,
    unit: DurationUnit,
) -> Result<DateTime<Utc>, ScheduleError> {
    match unit {
        DurationUnit::Days => start
            .checked_add_signed(Duration::days(i64::from(count)))
            .ok_or(ScheduleError::DateOverflow),
        DurationUnit::Weeks => start
            .checked_add_signed(Duration::weeks(i64::from(count)))
            .ok_or(ScheduleError::DateOverflow),
        DurationUnit::Months => start
            .checked_add_months(Months::new(count))
            .ok_or(ScheduleError::DateOverflow),
        DurationUnit::Years => {
            let months = count.checked_mul(12).ok_or(ScheduleError::DateOverflow)?;
            start
                .checked_add_months(Months::new(months))
                .ok_or(ScheduleError::DateOverflow)
        }
    }
}

/// Number of EMIs for a plan duration.
///
/// Month plans pay monthly, year plans pay monthly (12 per year), week
/// plans pay weekly.
///
/// # Errors
///
/// Returns `EmiUnsupportedForDays` for day-denominated plans and
/// `InvalidDuration` for zero durations.
pub fn emi_count(duration: u32, unit: DurationUnit) -> Result<u32, ScheduleError> {
    if duration == 0 {
        return Err(ScheduleError::InvalidDuration);
    }
    match unit {
        DurationUnit::Days => Err(ScheduleError::EmiUnsupportedForDays),
        DurationUnit::Weeks | DurationUnit::Months => Ok(duration),
        DurationUnit::Years => duration
            .checked_mul(12)
            .ok_or(ScheduleError::InvalidDuration),
    }
}

/// Builds the `(amount, due_date)` pairs of an EMI schedule.
///
/// Amounts come from an exact-sum equal split, so the installments add
/// up to `total` with no rounding loss. Due dates land one cadence
/// period apart, starting one period after `start`.
///
/// # Errors
///
/// Propagates [`emi_count`] and [`advance`] failures.
pub fn emi_schedule(
    total: Money,
    duration: u32,
    unit: DurationUnit,
    start: DateTime<Utc>,
) -> Result<Vec<(Money, DateTime<Utc>)>, ScheduleError> {
    let count = emi_count(duration, unit)?;
    let cadence = match unit {
        DurationUnit::Weeks => DurationUnit::Weeks,
        // Year plans are charged monthly.
        _ => DurationUnit::Months,
    };

    let amounts = split_equal(total, count as usize);
    let mut schedule = Vec::with_capacity(amounts.len());
    for (index, amount) in amounts.into_iter().enumerate() {
        let periods = u32::try_from(index + 1).map_err(|_| ScheduleError::DateOverflow)?;
        let due_date = advance(start, periods, cadence)?;
        schedule.push((amount, due_date));
    }
    Ok(schedule)
}
