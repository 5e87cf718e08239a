use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{monthly_payment, monthly_rate};
use crate::types::{Money, Percent};

/// One period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period number.
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Balance after this payment, clamped at zero.
    pub balance: Money,
}

/// Lazily walks an amortization schedule period by period.
///
/// Stops at `term_months`, or earlier the moment the running balance is
/// retired. Cloning (or calling [`schedule_iter`] again) restarts from
/// period one.
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    payment: Money,
    rate: Decimal,
    balance: Money,
    next_period: u32,
    term_months: u32,
    retired: bool,
}

impl Iterator for ScheduleIter {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.retired || self.next_period > self.term_months {
            return None;
        }

        let interest = self.balance.saturating_mul(self.rate);
        let principal = self.payment.saturating_sub(interest);
        self.balance = self.balance.saturating_sub(principal);

        let row = AmortizationRow {
            period: self.next_period,
            payment: self.payment,
            principal,
            interest,
            balance: self.balance.max(Decimal::ZERO),
        };

        self.next_period += 1;
        if self.balance <= Decimal::ZERO {
            self.retired = true;
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.retired {
            return (0, Some(0));
        }
        let remaining = self.term_months.saturating_sub(self.next_period - 1) as usize;
        (remaining.min(1), Some(remaining))
    }
}

/// Iterator over the amortization schedule of a fixed-rate loan.
///
/// A non-positive principal or zero term produces an empty schedule. The
/// balance only settles at zero for inputs that pass
/// [`is_amortizable`](super::payment::is_amortizable); beyond that the level
/// payment degrades towards interest-only.
pub fn schedule_iter(principal: Money, annual_rate_percent: Percent, term_months: u32) -> ScheduleIter {
    let degenerate = principal <= Decimal::ZERO || term_months == 0;
    // Negative rates repay straight-line, so they accrue no interest either
    let rate = if annual_rate_percent > Decimal::ZERO {
        monthly_rate(annual_rate_percent)
    } else {
        Decimal::ZERO
    };

    ScheduleIter {
        payment: monthly_payment(principal, annual_rate_percent, term_months),
        rate,
        balance: principal,
        next_period: 1,
        term_months,
        retired: degenerate,
    }
}

/// Full amortization schedule for a fixed-rate loan.
pub fn generate_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> Vec<AmortizationRow> {
    schedule_iter(principal, annual_rate_percent, term_months).collect()
}
