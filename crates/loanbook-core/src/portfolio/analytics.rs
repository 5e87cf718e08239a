use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::loan::{Loan, LoanStatus};
use super::payment::{Payment, PaymentStatus};
use crate::risk::RiskLevel;
use crate::types::{Money, Percent};

/// Months covered by the payment outlook.
const OUTLOOK_MONTHS: u32 = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub pending: usize,
    pub active: usize,
    pub paid: usize,
    pub defaulted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub very_high: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountByRisk {
    pub low: Money,
    pub medium: Money,
    pub high: Money,
    pub very_high: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusDistribution {
    pub paid: usize,
    pub pending: usize,
    pub late: usize,
    pub missed: usize,
}

/// Cash expected versus received for payments due in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCashflow {
    /// Short label, e.g. "Jan 2024".
    pub month: String,
    pub month_start: NaiveDate,
    pub expected: Money,
    pub received: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAnalytics {
    pub total_loans: usize,
    pub total_amount: Money,
    pub average_interest_rate: Percent,
    pub status_distribution: StatusDistribution,
    pub risk_distribution: RiskDistribution,
    pub amount_by_risk: AmountByRisk,
    pub monthly_payments: Vec<MonthlyCashflow>,
    pub payment_status_distribution: PaymentStatusDistribution,
}

/// Aggregate a loan book into dashboard figures.
///
/// The cash-flow outlook covers the twelve calendar months starting with the
/// month containing `as_of`.
pub fn portfolio_analytics(loans: &[Loan], payments: &[Payment], as_of: NaiveDate) -> PortfolioAnalytics {
    let mut status_distribution = StatusDistribution::default();
    let mut risk_distribution = RiskDistribution::default();
    let mut amount_by_risk = AmountByRisk::default();
    let mut total_amount = Decimal::ZERO;
    let mut rate_sum = Decimal::ZERO;

    for loan in loans {
        total_amount += loan.amount;
        rate_sum += loan.interest_rate;

        match loan.status {
            LoanStatus::Pending => status_distribution.pending += 1,
            LoanStatus::Active => status_distribution.active += 1,
            LoanStatus::Paid => status_distribution.paid += 1,
            LoanStatus::Defaulted => status_distribution.defaulted += 1,
        }
        let (count, amount) = match loan.risk_level {
            RiskLevel::Low => (&mut risk_distribution.low, &mut amount_by_risk.low),
            RiskLevel::Medium => (&mut risk_distribution.medium, &mut amount_by_risk.medium),
            RiskLevel::High => (&mut risk_distribution.high, &mut amount_by_risk.high),
            RiskLevel::VeryHigh => (
                &mut risk_distribution.very_high,
                &mut amount_by_risk.very_high,
            ),
        };
        *count += 1;
        *amount += loan.amount;
    }

    let average_interest_rate = if loans.is_empty() {
        Decimal::ZERO
    } else {
        rate_sum / Decimal::from(loans.len() as u64)
    };

    let mut payment_status_distribution = PaymentStatusDistribution::default();
    for payment in payments {
        match payment.status {
            PaymentStatus::Paid => payment_status_distribution.paid += 1,
            PaymentStatus::Pending => payment_status_distribution.pending += 1,
            PaymentStatus::Late => payment_status_distribution.late += 1,
            PaymentStatus::Missed => payment_status_distribution.missed += 1,
        }
    }

    PortfolioAnalytics {
        total_loans: loans.len(),
        total_amount,
        average_interest_rate,
        status_distribution,
        risk_distribution,
        amount_by_risk,
        monthly_payments: monthly_outlook(payments, as_of),
        payment_status_distribution,
    }
}

fn monthly_outlook(payments: &[Payment], as_of: NaiveDate) -> Vec<MonthlyCashflow> {
    let first = as_of.with_day(1).unwrap_or(as_of);

    (0..OUTLOOK_MONTHS)
        .filter_map(|offset| first.checked_add_months(Months::new(offset)))
        .map(|month_start| {
            let in_month = payments.iter().filter(|p| {
                p.due_date.year() == month_start.year() && p.due_date.month() == month_start.month()
            });
            let (expected, received) =
                in_month.fold((Decimal::ZERO, Decimal::ZERO), |(exp, rec), p| {
                    let rec = if p.status.is_received() { rec + p.amount } else { rec };
                    (exp + p.amount, rec)
                });
            MonthlyCashflow {
                month: month_start.format("%b %Y").to_string(),
                month_start,
                expected,
                received,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::generator::{generate_payments_for_loan, FixedOffsets};
    use crate::portfolio::loan::LoanDraft;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn loan(id: &str, amount: Decimal, rate: Decimal, status: LoanStatus, credit: u32) -> Loan {
        let draft = LoanDraft {
            name: format!("Loan {id}"),
            amount,
            interest_rate: rate,
            term_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            status,
            borrower_name: "Borrower".into(),
            borrower_email: "b@example.com".into(),
            description: None,
            credit_score: Some(credit),
            collateral: None,
        };
        Loan::open(id.into(), draft, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_book() {
        let a = portfolio_analytics(&[], &[], NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(a.total_loans, 0);
        assert_eq!(a.average_interest_rate, Decimal::ZERO);
        assert_eq!(a.monthly_payments.len(), 12);
        assert_eq!(a.monthly_payments[0].month, "May 2024");
        assert_eq!(a.monthly_payments[11].month, "Apr 2025");
    }

    #[test]
    fn test_distributions_and_totals() {
        let loans = vec![
            // 50 − 20 + 15 − 5 (term 12) = 40 → medium
            loan("1", dec!(1000), dec!(5), LoanStatus::Active, 780),
            // 50 + 20 + 15 + 10 − 5 = 90 → very high
            loan("2", dec!(3000), dec!(9), LoanStatus::Defaulted, 550),
            loan("3", dec!(2000), dec!(4), LoanStatus::Pending, 780),
        ];
        let a = portfolio_analytics(&loans, &[], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(a.total_loans, 3);
        assert_eq!(a.total_amount, dec!(6000));
        assert_eq!(a.average_interest_rate, dec!(6));
        assert_eq!(
            a.status_distribution,
            StatusDistribution { pending: 1, active: 1, paid: 0, defaulted: 1 }
        );
        assert_eq!(
            a.risk_distribution,
            RiskDistribution { low: 0, medium: 2, high: 0, very_high: 1 }
        );
        assert_eq!(a.amount_by_risk.medium, dec!(3000));
        assert_eq!(a.amount_by_risk.very_high, dec!(3000));
    }

    #[test]
    fn test_monthly_outlook_expected_vs_received() {
        let l = loan("1", dec!(12000), dec!(0), LoanStatus::Active, 700);
        let payments = generate_payments_for_loan(&l, &mut FixedOffsets(0)).unwrap();
        let a = portfolio_analytics(&[l], &payments, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());

        // May: payment 5, paid
        assert_eq!(a.monthly_payments[0].month_start, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(a.monthly_payments[0].expected, dec!(1000));
        assert_eq!(a.monthly_payments[0].received, dec!(1000));
        // June: payment 6, late still counts as received
        assert_eq!(a.monthly_payments[1].received, dec!(1000));
        // July: payment 7, pending
        assert_eq!(a.monthly_payments[2].expected, dec!(1000));
        assert_eq!(a.monthly_payments[2].received, Decimal::ZERO);
        // Jan 2025: past the last due date
        assert_eq!(a.monthly_payments[8].expected, Decimal::ZERO);

        assert_eq!(
            a.payment_status_distribution,
            PaymentStatusDistribution { paid: 5, pending: 6, late: 1, missed: 0 }
        );
    }
}
