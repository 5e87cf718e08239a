use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loanbook_core::risk::{self, RiskInput};

use crate::input;

/// Arguments for a loan risk assessment
#[derive(Args)]
pub struct RiskArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Borrower credit score (300-850)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Collateral value
    #[arg(long)]
    pub collateral: Option<Decimal>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let risk_input: RiskInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            RiskInput {
                amount: args.amount.ok_or("--amount is required (or provide --input)")?,
                interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
                term_months: args.term.ok_or("--term is required (or provide --input)")?,
                credit_score: args.credit_score,
                collateral: args.collateral,
            }
        }
    };

    let result = risk::assess_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}
