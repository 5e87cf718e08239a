//! Fixed-rate amortization: payment sizing, schedules, comparisons and the
//! calculator envelopes built on top of them.

pub mod calculators;
pub mod comparison;
pub mod payment;
pub mod schedule;

pub use comparison::{compare_rates, compare_terms, RateComparison, TermComparison};
pub use payment::{
    affordable_loan_amount, compound_factor, debt_to_income, is_amortizable, is_negligible,
    monthly_payment, monthly_rate, total_interest,
};
pub use schedule::{generate_schedule, schedule_iter, AmortizationRow, ScheduleIter};
