//! Loan book: loan and payment records, simulated payment history,
//! persistence, lifecycle service and portfolio analytics.

pub mod analytics;
pub mod generator;
pub mod loan;
pub mod payment;
pub mod repository;
pub mod sample;
pub mod service;

pub use analytics::{portfolio_analytics, MonthlyCashflow, PortfolioAnalytics};
pub use generator::{generate_payments_for_loan, DayOffsetSource, FixedOffsets, SeededOffsets};
pub use loan::{Loan, LoanDraft, LoanId, LoanPatch, LoanStatus, PatchEffect};
pub use payment::{Payment, PaymentId, PaymentStatus};
pub use repository::{InMemoryLoanRepository, LoanRepository};
pub use sample::sample_loans;
pub use service::LoanService;
