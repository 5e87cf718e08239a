use chrono::{Months, NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use loanbook_core::portfolio::{
    sample_loans, InMemoryLoanRepository, LoanDraft, LoanService, LoanStatus, SeededOffsets,
};

use crate::input;

/// Arguments for generating a loan's payment schedule
#[derive(Args)]
pub struct PaymentsArgs {
    /// Path to a JSON loan (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan name
    #[arg(long, default_value = "Loan")]
    pub name: String,

    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// First due date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Loan status driving the simulated payment history
    #[arg(long, default_value = "active")]
    pub status: LoanStatus,

    /// Borrower name
    #[arg(long, default_value = "Borrower")]
    pub borrower: String,

    /// Borrower e-mail
    #[arg(long, default_value = "borrower@example.com")]
    pub email: String,

    /// Borrower credit score (300-850)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Collateral value
    #[arg(long)]
    pub collateral: Option<Decimal>,

    /// Seed for reproducible payment dates
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for loan book analytics
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON array of loans
    #[arg(long, conflicts_with = "sample")]
    pub input: Option<String>,

    /// Use the built-in demonstration book
    #[arg(long)]
    pub sample: bool,

    /// Start of the twelve-month cash-flow outlook (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// List the scored loans instead of the analytics summary
    #[arg(long)]
    pub list: bool,

    /// Seed for reproducible payment dates
    #[arg(long)]
    pub seed: Option<u64>,
}

fn in_memory_book(seed: Option<u64>) -> LoanService<InMemoryLoanRepository> {
    LoanService::new(InMemoryLoanRepository::new(), SeededOffsets::new(seed))
}

pub fn run_payments(args: PaymentsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: LoanDraft = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let term = args.term.ok_or("--term is required (or provide --input)")?;
            let start_date = args.start_date.unwrap_or_else(|| Utc::now().date_naive());
            let end_date = start_date
                .checked_add_months(Months::new(term))
                .ok_or("--term pushes the end date out of range")?;
            LoanDraft {
                name: args.name,
                amount: args.amount.ok_or("--amount is required (or provide --input)")?,
                interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
                term_months: term,
                start_date,
                end_date,
                status: args.status,
                borrower_name: args.borrower,
                borrower_email: args.email,
                description: None,
                credit_score: args.credit_score,
                collateral: args.collateral,
            }
        }
    };

    let book = in_memory_book(args.seed);
    let loan = book.create_loan(draft)?;
    let payments = book.get_payments(&loan.id)?;
    Ok(serde_json::to_value(payments)?)
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let drafts: Vec<LoanDraft> = if args.sample {
        sample_loans()
    } else {
        input::load(args.input.as_deref())?.ok_or("Provide --input, piped JSON, or --sample")?
    };

    let book = in_memory_book(args.seed);
    for draft in drafts {
        book.create_loan(draft)?;
    }
    debug!(loans = book.repository().len(), "loan book loaded");

    if args.list {
        return Ok(serde_json::to_value(book.list_loans()?)?);
    }
    let as_of = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    Ok(serde_json::to_value(book.analytics(as_of)?)?)
}
