//! Year-end asset forecast engine
//!
//! Combines independent read-only aggregates (current totals, salary
//! income, expense run-rate, investment interest) into a single projected
//! year-end balance. The engine is stateless: every call recomputes from
//! current store contents and the injected clock, and no partial result is
//! ever returned.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::clock::Clock;
use crate::db::Database;
use crate::error::Result;
use crate::models::{AssetForecast, Scope};

/// Trailing window for the daily expense run-rate, in days
const EXPENSE_WINDOW_DAYS: i64 = 30;

/// Days used to convert an annual interest rate to a daily rate
const DAYS_PER_YEAR: u32 = 365;

/// Asset forecaster over a ledger store and a time source
pub struct Forecaster<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> Forecaster<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Project assets at Dec 31 of the current year
    ///
    /// predicted = current + monthly_income x remaining_months
    ///           - daily_expense x remaining_days + interest_income
    ///
    /// The identity holds exactly over the component values returned in
    /// the same result.
    pub fn predict_year_end(&self, scope: Scope) -> Result<AssetForecast> {
        let current_total_assets = self.db.total_assets(scope)?;
        let monthly_income = self.db.salary_total(scope)?;
        let daily_expense = self.daily_expense_rate(scope)?;

        let today = self.clock.today();
        let days = remaining_days(today);
        let months = remaining_months(today);

        let expected_income = monthly_income * Decimal::from(months);
        let expected_expense = daily_expense * Decimal::from(days);
        let interest_income = self.interest_income(scope, days)?;

        let predicted_year_end_assets =
            current_total_assets + expected_income - expected_expense + interest_income;

        Ok(AssetForecast {
            current_total_assets,
            monthly_income,
            daily_expense,
            predicted_year_end_assets,
            expected_income,
            expected_expense,
            interest_income,
        })
    }

    /// Average daily spend over the trailing 30-day window
    ///
    /// The denominator is the number of calendar dates that actually have
    /// spending, not the window length; infrequent spenders with a few
    /// large transactions would otherwise look cheaper than they are.
    /// Returns 0 when the window has no spending at all.
    pub fn daily_expense_rate(&self, scope: Scope) -> Result<Decimal> {
        let end = self.clock.today();
        let start = end - Duration::days(EXPENSE_WINDOW_DAYS);

        let total = self.db.expense_total_in_range(scope, start, end)?;
        let active_days = self.db.distinct_expense_days_in_range(scope, start, end)?;
        if active_days == 0 {
            return Ok(Decimal::ZERO);
        }

        Ok((total / Decimal::from(active_days))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Simple (non-compounding) interest earned over `remaining_days`
    ///
    /// Each qualifying investment contributes amount x daily_rate x days,
    /// where the daily rate is rounded half-up to 6 places after each
    /// division step. Holding the daily rate constant instead of
    /// compounding is a deliberate trade of precision for determinism.
    pub fn interest_income(&self, scope: Scope, remaining_days: i64) -> Result<Decimal> {
        let records = self.db.investment_records(scope)?;

        let mut total = Decimal::ZERO;
        for record in records {
            let Some(rate) = record.annual_interest_rate else {
                continue;
            };
            let daily_rate = round6(round6(rate / Decimal::ONE_HUNDRED) / Decimal::from(DAYS_PER_YEAR));
            total += record.amount * daily_rate * Decimal::from(remaining_days);
        }

        Ok(total)
    }
}

fn round6(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole days from `today` to Dec 31 of the same year, clamped at 0
pub fn remaining_days(today: NaiveDate) -> i64 {
    let year_end = year_end_of(today);
    (year_end - today).num_days().max(0)
}

/// Whole calendar months from `today` to Dec 31 of the same year
pub fn remaining_months(today: NaiveDate) -> i64 {
    let year_end = year_end_of(today);
    let mut months =
        i64::from(year_end.month()) - i64::from(today.month());
    if year_end.day() < today.day() {
        months -= 1;
    }
    months.max(0)
}

fn year_end_of(today: NaiveDate) -> NaiveDate {
    // Dec 31 exists in every year
    NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap()
}
