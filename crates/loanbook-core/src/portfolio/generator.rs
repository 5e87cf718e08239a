use chrono::{Days, Months, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::{Decimal, RoundingStrategy};

use super::loan::{Loan, LoanStatus};
use super::payment::{Payment, PaymentStatus};
use crate::amortization::schedule_iter;
use crate::{LoanbookError, LoanbookResult};

/// Source of the day offsets used to simulate when past payments arrived.
pub trait DayOffsetSource {
    /// A value in `0..upper`; zero when `upper` is zero.
    fn offset(&mut self, upper: u32) -> u32;
}

/// Pseudo-random offsets from a seedable generator.
pub struct SeededOffsets {
    rng: StdRng,
}

impl SeededOffsets {
    /// Reproducible offsets for a given seed, or entropy-seeded when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        SeededOffsets { rng }
    }
}

impl DayOffsetSource for SeededOffsets {
    fn offset(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        self.rng.gen_range(0..upper)
    }
}

/// Always the same offset (capped below `upper`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsets(pub u32);

impl DayOffsetSource for FixedOffsets {
    fn offset(&mut self, upper: u32) -> u32 {
        self.0.min(upper.saturating_sub(1))
    }
}

/// When a settled payment arrived relative to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    /// 0 to `window - 1` days early.
    Early { window: u32 },
    /// `min` to `min + span - 1` days late.
    Overdue { min: u32, span: u32 },
}

/// Simulated payment history for a period, keyed on the owning loan's status.
fn simulate(status: LoanStatus, period: u32) -> (PaymentStatus, Option<Settlement>) {
    match (status, period) {
        (LoanStatus::Active, 1..=5) => (PaymentStatus::Paid, Some(Settlement::Early { window: 5 })),
        (LoanStatus::Active, 6) => (
            PaymentStatus::Late,
            Some(Settlement::Overdue { min: 1, span: 10 }),
        ),
        (LoanStatus::Defaulted, 1..=3) => {
            (PaymentStatus::Paid, Some(Settlement::Early { window: 5 }))
        }
        (LoanStatus::Defaulted, 4..=5) => (
            PaymentStatus::Late,
            Some(Settlement::Overdue { min: 5, span: 15 }),
        ),
        (LoanStatus::Defaulted, 6..=7) => (PaymentStatus::Missed, None),
        _ => (PaymentStatus::Pending, None),
    }
}

fn settle<S: DayOffsetSource + ?Sized>(
    due: NaiveDate,
    settlement: Settlement,
    offsets: &mut S,
) -> Option<NaiveDate> {
    match settlement {
        Settlement::Early { window } => {
            due.checked_sub_days(Days::new(u64::from(offsets.offset(window))))
        }
        Settlement::Overdue { min, span } => {
            let late_by = min + offsets.offset(span);
            due.checked_add_days(Days::new(u64::from(late_by)))
        }
    }
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build the full payment schedule for a loan.
///
/// One payment per amortization period, due monthly from the start date
/// (clamped to month end for short months), amounts rounded to cents. Past
/// payment history is simulated from the loan status with day offsets drawn
/// from `offsets`.
pub fn generate_payments_for_loan<S: DayOffsetSource + ?Sized>(
    loan: &Loan,
    offsets: &mut S,
) -> LoanbookResult<Vec<Payment>> {
    schedule_iter(loan.amount, loan.interest_rate, loan.term_months)
        .map(|row| -> LoanbookResult<Payment> {
            let due_date = loan
                .start_date
                .checked_add_months(Months::new(row.period - 1))
                .ok_or_else(|| {
                    LoanbookError::DateError(format!(
                        "Due date for payment {} of loan {} is out of range",
                        row.period, loan.id
                    ))
                })?;

            let (status, settlement) = simulate(loan.status, row.period);
            let paid_date = settlement.and_then(|s| settle(due_date, s, offsets));
            let updated_at = paid_date
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                .unwrap_or(loan.updated_at);

            Ok(Payment {
                id: Payment::payment_id(&loan.id, row.period),
                loan_id: loan.id.clone(),
                payment_number: row.period,
                due_date,
                amount: cents(row.payment),
                principal: cents(row.principal),
                interest: cents(row.interest),
                status,
                paid_date,
                created_at: loan.created_at,
                updated_at,
            })
        })
        .collect()
}
