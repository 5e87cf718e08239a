use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use loanbook_core::portfolio::{InMemoryLoanRepository, LoanDraft, LoanService, SeededOffsets};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn in_memory_book(seed: Option<u32>) -> LoanService<InMemoryLoanRepository> {
    LoanService::new(
        InMemoryLoanRepository::new(),
        SeededOffsets::new(seed.map(u64::from)),
    )
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_repayment(input_json: String) -> NapiResult<String> {
    let input: loanbook_core::amortization::calculators::RepaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loanbook_core::amortization::calculators::calculate_repayment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_affordability(input_json: String) -> NapiResult<String> {
    let input: loanbook_core::amortization::calculators::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loanbook_core::amortization::calculators::calculate_affordability(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_loan_options(input_json: String) -> NapiResult<String> {
    let input: loanbook_core::amortization::calculators::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loanbook_core::amortization::calculators::compare_loan_options(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_risk(input_json: String) -> NapiResult<String> {
    let input: loanbook_core::risk::RiskInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loanbook_core::risk::assess_risk(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan book
// ---------------------------------------------------------------------------

/// Payment schedule, with simulated history, for one loan.
#[napi]
pub fn generate_payment_schedule(loan_json: String, seed: Option<u32>) -> NapiResult<String> {
    let draft: LoanDraft = serde_json::from_str(&loan_json).map_err(to_napi_error)?;
    let book = in_memory_book(seed);
    let loan = book.create_loan(draft).map_err(to_napi_error)?;
    let payments = book.get_payments(&loan.id).map_err(to_napi_error)?;
    serde_json::to_string(&payments).map_err(to_napi_error)
}

/// Analytics for an array of loans; `as_of` is an ISO date (YYYY-MM-DD).
#[napi]
pub fn portfolio_analytics(loans_json: String, as_of: String, seed: Option<u32>) -> NapiResult<String> {
    let drafts: Vec<LoanDraft> = serde_json::from_str(&loans_json).map_err(to_napi_error)?;
    let as_of: NaiveDate = as_of.parse().map_err(to_napi_error)?;
    let book = in_memory_book(seed);
    for draft in drafts {
        book.create_loan(draft).map_err(to_napi_error)?;
    }
    let analytics = book.analytics(as_of).map_err(to_napi_error)?;
    serde_json::to_string(&analytics).map_err(to_napi_error)
}
