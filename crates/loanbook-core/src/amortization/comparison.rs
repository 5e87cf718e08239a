use serde::{Deserialize, Serialize};

use super::payment::{monthly_payment, total_interest};
use crate::types::{Money, Percent};

/// Cost of a loan at one candidate interest rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateComparison {
    pub rate: Percent,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
}

/// Cost of a loan over one candidate term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermComparison {
    pub term: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
}

/// Price the same principal and term at each rate, in input order.
pub fn compare_rates(principal: Money, term_months: u32, rates: &[Percent]) -> Vec<RateComparison> {
    rates
        .iter()
        .map(|&rate| {
            let payment = monthly_payment(principal, rate, term_months);
            let interest = total_interest(principal, payment, term_months);
            RateComparison {
                rate,
                monthly_payment: payment,
                total_interest: interest,
                total_cost: principal.saturating_add(interest),
            }
        })
        .collect()
}

/// Price the same principal and rate over each term, in input order.
pub fn compare_terms(
    principal: Money,
    annual_rate_percent: Percent,
    terms: &[u32],
) -> Vec<TermComparison> {
    terms
        .iter()
        .map(|&term| {
            let payment = monthly_payment(principal, annual_rate_percent, term);
            let interest = total_interest(principal, payment, term);
            TermComparison {
                term,
                monthly_payment: payment,
                total_interest: interest,
                total_cost: principal.saturating_add(interest),
            }
        })
        .collect()
}
