use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::comparison::{compare_rates, compare_terms, RateComparison, TermComparison};
use super::payment::{
    affordable_loan_amount, debt_to_income, is_amortizable, is_negligible, monthly_payment,
    total_interest,
};
use super::schedule::{generate_schedule, AmortizationRow};
use crate::{types::*, LoanbookError, LoanbookResult};

/// Share of free monthly cash flow lenders will let go to debt service.
pub const DEFAULT_MAX_DTI_PERCENT: Percent = dec!(36);

/// Rate offsets (percentage points) for the affordability sensitivity curve.
const SENSITIVITY_OFFSETS: [Decimal; 5] = [dec!(-2), dec!(-1), dec!(0), dec!(1), dec!(2)];

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    /// Return every period rather than only the yearly roll-up.
    #[serde(default)]
    pub include_schedule: bool,
}

/// Totals for one loan-year (periods 1-12 are year 1, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub payments: Money,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentOutput {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
    /// Number of periods actually needed to retire the loan.
    pub periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<AmortizationRow>>,
    pub yearly_summary: Vec<YearSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
    /// Debt service cap as a percentage of free cash flow. Defaults to 36.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dti_percent: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSensitivity {
    pub rate: Percent,
    pub affordable_amount: Money,
    pub total_purchase: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub available_monthly: Money,
    pub monthly_payment: Money,
    pub affordable_amount: Money,
    pub dti_percent: Percent,
    pub total_purchase: Money,
    pub rate_sensitivity: Vec<RateSensitivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub principal: Money,
    /// Term held fixed while rates vary.
    pub term_months: u32,
    /// Rate held fixed while terms vary.
    pub annual_rate_percent: Percent,
    #[serde(default)]
    pub rates: Vec<Percent>,
    #[serde(default)]
    pub terms: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub rate_comparisons: Vec<RateComparison>,
    pub term_comparisons: Vec<TermComparison>,
    pub lowest_cost_rate: Option<Percent>,
    pub lowest_cost_term: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly payment, lifetime interest and the repayment breakdown of a loan.
pub fn calculate_repayment(
    input: &RepaymentInput,
) -> LoanbookResult<ComputationOutput<RepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_principal("principal", input.principal)?;
    validate_rate("annual_rate_percent", input.annual_rate_percent)?;
    validate_term("term_months", input.term_months)?;
    validate_amortizable(input.principal, input.annual_rate_percent, input.term_months)?;

    let payment = monthly_payment(input.principal, input.annual_rate_percent, input.term_months);
    let interest = total_interest(input.principal, payment, input.term_months);
    let schedule = generate_schedule(input.principal, input.annual_rate_percent, input.term_months);
    let periods = schedule.len() as u32;

    if input.annual_rate_percent.is_zero() && is_negligible(interest) {
        warnings.push("Zero interest rate: repayment is straight-line".into());
    }
    if periods < input.term_months {
        warnings.push(format!(
            "Balance retired after {periods} of {} periods",
            input.term_months
        ));
    }

    let output = RepaymentOutput {
        monthly_payment: payment,
        total_interest: interest,
        total_cost: checked_sum("total_cost", input.principal, interest)?,
        periods,
        yearly_summary: summarize_by_year(&schedule),
        schedule: input.include_schedule.then_some(schedule),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": super::payment::monthly_rate(input.annual_rate_percent).to_string(),
    });

    Ok(with_metadata(
        "Fixed-rate level-payment amortization",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// How much can be borrowed given income, expenses and a debt-service cap.
pub fn calculate_affordability(
    input: &AffordabilityInput,
) -> LoanbookResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_affordability_input(input)?;

    let max_dti = input.max_dti_percent.unwrap_or(DEFAULT_MAX_DTI_PERCENT);
    let down_payment = input.down_payment.unwrap_or(Decimal::ZERO);

    let available = input.monthly_income - input.monthly_expenses;
    if available <= Decimal::ZERO {
        warnings.push("Monthly expenses meet or exceed income; nothing is affordable".into());
    }

    let budget = available
        .checked_mul(max_dti)
        .map(|v| v / dec!(100))
        .ok_or_else(|| LoanbookError::invalid("monthly_income", "Income is out of range"))?;
    let affordable = affordable_loan_amount(budget, input.annual_rate_percent, input.term_months);

    let rate_sensitivity = SENSITIVITY_OFFSETS
        .iter()
        .map(|offset| input.annual_rate_percent + offset)
        .filter(|rate| *rate > Decimal::ZERO)
        .map(|rate| -> LoanbookResult<RateSensitivity> {
            let amount = affordable_loan_amount(budget, rate, input.term_months);
            Ok(RateSensitivity {
                rate,
                affordable_amount: amount,
                total_purchase: checked_sum("down_payment", amount, down_payment)?,
            })
        })
        .collect::<LoanbookResult<Vec<_>>>()?;

    let output = AffordabilityOutput {
        available_monthly: available,
        monthly_payment: budget,
        affordable_amount: affordable,
        dti_percent: debt_to_income(budget, input.monthly_income),
        total_purchase: checked_sum("down_payment", affordable, down_payment)?,
        rate_sensitivity,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "max_dti_percent": max_dti.to_string(),
        "down_payment": down_payment.to_string(),
    });

    Ok(with_metadata(
        "Affordability from free cash flow and DTI cap",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Side-by-side cost of alternative rates and terms for one principal.
pub fn compare_loan_options(
    input: &ComparisonInput,
) -> LoanbookResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_principal("principal", input.principal)?;
    validate_term("term_months", input.term_months)?;
    validate_rate("annual_rate_percent", input.annual_rate_percent)?;
    if input.rates.is_empty() && input.terms.is_empty() {
        return Err(LoanbookError::invalid(
            "rates",
            "Provide at least one rate or term to compare",
        ));
    }

    let rate_comparisons = price_rates(input.principal, input.term_months, &input.rates)?;
    let term_comparisons = price_terms(input.principal, input.annual_rate_percent, &input.terms)?;

    let lowest_cost_rate = rate_comparisons
        .iter()
        .min_by_key(|c| c.total_cost)
        .map(|c| c.rate);
    let lowest_cost_term = term_comparisons
        .iter()
        .min_by_key(|c| c.total_cost)
        .map(|c| c.term);

    let output = ComparisonOutput {
        rate_comparisons,
        term_comparisons,
        lowest_cost_rate,
        lowest_cost_term,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "fixed_term_months": input.term_months,
        "fixed_rate_percent": input.annual_rate_percent.to_string(),
    });

    Ok(with_metadata(
        "Rate and term comparison",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Validated [`compare_rates`]: every candidate must be a schedulable loan.
pub fn price_rates(
    principal: Money,
    term_months: u32,
    rates: &[Percent],
) -> LoanbookResult<Vec<RateComparison>> {
    validate_principal("principal", principal)?;
    validate_term("term_months", term_months)?;
    for rate in rates {
        validate_rate("rates", *rate)?;
        validate_amortizable(principal, *rate, term_months)?;
    }
    Ok(compare_rates(principal, term_months, rates))
}

/// Validated [`compare_terms`].
pub fn price_terms(
    principal: Money,
    annual_rate_percent: Percent,
    terms: &[u32],
) -> LoanbookResult<Vec<TermComparison>> {
    validate_principal("principal", principal)?;
    validate_rate("annual_rate_percent", annual_rate_percent)?;
    for term in terms {
        validate_term("terms", *term)?;
        validate_amortizable(principal, annual_rate_percent, *term)?;
    }
    Ok(compare_terms(principal, annual_rate_percent, terms))
}

/// Validated [`debt_to_income`]: debt must be non-negative and income positive.
pub fn calculate_dti(monthly_debt: Money, monthly_income: Money) -> LoanbookResult<Percent> {
    if monthly_debt < Decimal::ZERO {
        return Err(LoanbookError::invalid(
            "monthly_debt",
            "Monthly debt cannot be negative",
        ));
    }
    validate_principal("monthly_income", monthly_income)?;
    monthly_debt
        .checked_div(monthly_income)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| LoanbookError::invalid("monthly_income", "Ratio is out of range"))
}

/// Roll a schedule up into loan-years.
pub fn summarize_by_year(schedule: &[AmortizationRow]) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();
    for row in schedule {
        let year = (row.period - 1) / 12 + 1;
        match years.last_mut() {
            Some(summary) if summary.year == year => {
                summary.payments += row.payment;
                summary.principal += row.principal;
                summary.interest += row.interest;
                summary.closing_balance = row.balance;
            }
            _ => years.push(YearSummary {
                year,
                payments: row.payment,
                principal: row.principal,
                interest: row.interest,
                closing_balance: row.balance,
            }),
        }
    }
    years
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_principal(field: &str, value: Money) -> LoanbookResult<()> {
    if value <= Decimal::ZERO {
        return Err(LoanbookError::invalid(field, "Amount must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_rate(field: &str, value: Percent) -> LoanbookResult<()> {
    if value < Decimal::ZERO {
        return Err(LoanbookError::invalid(field, "Interest rate cannot be negative"));
    }
    if value > dec!(100) {
        return Err(LoanbookError::invalid(field, "Interest rate cannot exceed 100%"));
    }
    Ok(())
}

pub(crate) fn validate_term(field: &str, value: u32) -> LoanbookResult<()> {
    if value == 0 {
        return Err(LoanbookError::invalid(field, "Term must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_amortizable(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> LoanbookResult<()> {
    if !is_amortizable(principal, annual_rate_percent, term_months) {
        return Err(LoanbookError::invalid(
            "term_months",
            format!(
                "A {annual_rate_percent}% rate over {term_months} months compounds beyond \
                 the precision needed to amortize {principal}"
            ),
        ));
    }
    Ok(())
}

fn checked_sum(field: &str, a: Money, b: Money) -> LoanbookResult<Money> {
    a.checked_add(b)
        .ok_or_else(|| LoanbookError::invalid(field, "Amount is out of range"))
}

fn validate_affordability_input(input: &AffordabilityInput) -> LoanbookResult<()> {
    if input.monthly_income < Decimal::ZERO {
        return Err(LoanbookError::invalid(
            "monthly_income",
            "Monthly income cannot be negative",
        ));
    }
    if input.monthly_expenses < Decimal::ZERO {
        return Err(LoanbookError::invalid(
            "monthly_expenses",
            "Monthly expenses cannot be negative",
        ));
    }
    validate_rate("annual_rate_percent", input.annual_rate_percent)?;
    validate_term("term_months", input.term_months)?;
    if let Some(dp) = input.down_payment {
        if dp < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "down_payment",
                "Down payment cannot be negative",
            ));
        }
    }
    if let Some(cap) = input.max_dti_percent {
        if cap <= Decimal::ZERO || cap > dec!(100) {
            return Err(LoanbookError::invalid(
                "max_dti_percent",
                "DTI cap must be within (0, 100]",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
