use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loanbook_core::amortization::calculators::{
    self, AffordabilityInput, ComparisonInput, RepaymentInput,
};

use crate::input;

/// Arguments for the repayment calculator
#[derive(Args)]
pub struct RepaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (4.5 = 4.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Include the full amortization schedule
    #[arg(long)]
    pub schedule: bool,
}

/// Arguments for the affordability calculator
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly living expenses
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Cash down payment
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Maximum share of free cash flow for debt service, in percent
    #[arg(long)]
    pub max_dti: Option<Decimal>,
}

/// Arguments for comparing candidate interest rates
#[derive(Args)]
pub struct CompareRatesArgs {
    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Comma-separated annual rates in percent
    #[arg(long, value_delimiter = ',', required = true)]
    pub rates: Vec<Decimal>,
}

/// Arguments for comparing candidate terms
#[derive(Args)]
pub struct CompareTermsArgs {
    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Comma-separated terms in months
    #[arg(long, value_delimiter = ',', required = true)]
    pub terms: Vec<u32>,
}

/// Arguments for the combined rate and term comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Term held fixed while comparing rates
    #[arg(long)]
    pub term: Option<u32>,

    /// Rate held fixed while comparing terms
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Comma-separated alternative rates
    #[arg(long, value_delimiter = ',')]
    pub rates: Vec<Decimal>,

    /// Comma-separated alternative terms
    #[arg(long, value_delimiter = ',')]
    pub terms: Vec<u32>,
}

/// Arguments for the debt-to-income ratio
#[derive(Args)]
pub struct DtiArgs {
    /// Monthly debt obligations
    #[arg(long)]
    pub debt: Decimal,

    /// Gross monthly income
    #[arg(long)]
    pub income: Decimal,
}

pub fn run_repayment(args: RepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let repayment_input: RepaymentInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            RepaymentInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
                term_months: args.term.ok_or("--term is required (or provide --input)")?,
                include_schedule: args.schedule,
            }
        }
    };

    let result = calculators::calculate_repayment(&repayment_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let affordability_input: AffordabilityInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            AffordabilityInput {
                monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
                monthly_expenses: args
                    .expenses
                    .ok_or("--expenses is required (or provide --input)")?,
                annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
                term_months: args.term.ok_or("--term is required (or provide --input)")?,
                down_payment: args.down_payment,
                max_dti_percent: args.max_dti,
            }
        }
    };

    let result = calculators::calculate_affordability(&affordability_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_rates(args: CompareRatesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = calculators::price_rates(args.principal, args.term, &args.rates)?;
    Ok(serde_json::to_value(rows)?)
}

pub fn run_compare_terms(args: CompareTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = calculators::price_terms(args.principal, args.rate, &args.terms)?;
    Ok(serde_json::to_value(rows)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison_input: ComparisonInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            ComparisonInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                term_months: args.term.ok_or("--term is required (or provide --input)")?,
                annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
                rates: args.rates,
                terms: args.terms,
            }
        }
    };

    let result = calculators::compare_loan_options(&comparison_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dti(args: DtiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dti = calculators::calculate_dti(args.debt, args.income)?;
    Ok(json!({
        "monthly_debt": args.debt,
        "monthly_income": args.income,
        "dti_percent": dti,
    }))
}
