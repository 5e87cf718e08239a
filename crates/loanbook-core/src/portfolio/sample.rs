//! Demonstration loan book.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::loan::{LoanDraft, LoanStatus};

#[allow(clippy::too_many_arguments)]
fn draft(
    name: &str,
    amount: Decimal,
    interest_rate: Decimal,
    term_months: u32,
    start: (i32, u32, u32),
    status: LoanStatus,
    borrower: (&str, &str),
    description: &str,
    credit_score: u32,
    collateral: Decimal,
) -> LoanDraft {
    let start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap_or_default();
    let end_date = NaiveDate::from_ymd_opt(start.0 + (term_months / 12) as i32, start.1, start.2)
        .unwrap_or(start_date);
    LoanDraft {
        name: name.into(),
        amount,
        interest_rate,
        term_months,
        start_date,
        end_date,
        status,
        borrower_name: borrower.0.into(),
        borrower_email: borrower.1.into(),
        description: Some(description.into()),
        credit_score: Some(credit_score),
        collateral: Some(collateral),
    }
}

/// Eight representative loans covering mortgage, vehicle, business and
/// personal lending. All are active except one pending personal loan.
pub fn sample_loans() -> Vec<LoanDraft> {
    vec![
        draft(
            "Home Mortgage",
            dec!(250000),
            dec!(4.5),
            360,
            (2023, 1, 15),
            LoanStatus::Active,
            ("John Smith", "john.smith@example.com"),
            "30-year fixed rate mortgage for primary residence",
            780,
            dec!(300000),
        ),
        draft(
            "Auto Loan",
            dec!(35000),
            dec!(3.2),
            60,
            (2023, 2, 1),
            LoanStatus::Active,
            ("Sarah Johnson", "sarah.j@example.com"),
            "New vehicle financing",
            750,
            dec!(40000),
        ),
        draft(
            "Business Expansion",
            dec!(150000),
            dec!(6.75),
            120,
            (2022, 11, 1),
            LoanStatus::Active,
            ("Acme Corporation", "finance@acmecorp.com"),
            "Funding for new equipment and facility expansion",
            680,
            dec!(100000),
        ),
        draft(
            "Personal Loan",
            dec!(15000),
            dec!(8.5),
            36,
            (2023, 3, 15),
            LoanStatus::Pending,
            ("Michael Chen", "m.chen@example.com"),
            "Debt consolidation",
            620,
            dec!(0),
        ),
        draft(
            "Student Loan Refinance",
            dec!(45000),
            dec!(5.25),
            120,
            (2022, 9, 1),
            LoanStatus::Active,
            ("Emily Rodriguez", "e.rodriguez@example.com"),
            "Consolidation of federal and private student loans",
            710,
            dec!(0),
        ),
        draft(
            "Small Business Startup",
            dec!(75000),
            dec!(9.5),
            84,
            (2023, 4, 1),
            LoanStatus::Active,
            ("Tech Innovators LLC", "finance@techinnovators.com"),
            "Initial funding for tech startup",
            650,
            dec!(25000),
        ),
        draft(
            "Home Renovation",
            dec!(50000),
            dec!(5.75),
            60,
            (2023, 5, 15),
            LoanStatus::Active,
            ("David Wilson", "d.wilson@example.com"),
            "Kitchen and bathroom remodeling",
            760,
            dec!(250000),
        ),
        draft(
            "Commercial Property",
            dec!(500000),
            dec!(5.25),
            240,
            (2022, 12, 1),
            LoanStatus::Active,
            ("Retail Solutions Inc", "property@retailsolutions.com"),
            "Purchase of retail space in downtown area",
            720,
            dec!(650000),
        ),
    ]
}
