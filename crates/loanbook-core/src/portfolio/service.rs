//! Loan lifecycle on top of a `LoanRepository`.
//!
//! Every mutation holds the service's write lock for its whole
//! read-modify-write and persists the loan together with any regenerated
//! payments in one repository call, so stored risk fields and payment sets
//! always match the stored terms.

use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::analytics::{portfolio_analytics, PortfolioAnalytics};
use super::generator::{generate_payments_for_loan, DayOffsetSource, SeededOffsets};
use super::loan::{Loan, LoanDraft, LoanPatch};
use super::payment::{Payment, PaymentStatus};
use super::repository::LoanRepository;
use crate::{LoanbookError, LoanbookResult};

pub struct LoanService<R, S = SeededOffsets> {
    repository: R,
    /// Day-offset source for simulated payment history. Its lock doubles as
    /// the mutation lock.
    writer: Mutex<S>,
}

impl<R: LoanRepository> LoanService<R, SeededOffsets> {
    /// Service with entropy-seeded payment simulation.
    pub fn with_repository(repository: R) -> Self {
        Self::new(repository, SeededOffsets::new(None))
    }
}

impl<R, S> LoanService<R, S>
where
    R: LoanRepository,
    S: DayOffsetSource + Send,
{
    pub fn new(repository: R, offsets: S) -> Self {
        Self {
            repository,
            writer: Mutex::new(offsets),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn lock(&self) -> LoanbookResult<MutexGuard<'_, S>> {
        self.writer
            .lock()
            .map_err(|_| LoanbookError::Storage("loan service lock poisoned".into()))
    }

    pub fn list_loans(&self) -> LoanbookResult<Vec<Loan>> {
        self.repository.list_loans()
    }

    pub fn get_loan(&self, id: &str) -> LoanbookResult<Loan> {
        self.repository
            .find_loan(id)?
            .ok_or_else(|| LoanbookError::not_found("Loan", id))
    }

    /// Open a loan: validate, score risk, generate its payments, persist.
    pub fn create_loan(&self, draft: LoanDraft) -> LoanbookResult<Loan> {
        draft.validate()?;
        let mut offsets = self.lock()?;

        let loan = Loan::open(Uuid::new_v4().to_string(), draft, Utc::now());
        let payments = generate_payments_for_loan(&loan, &mut *offsets)?;
        self.repository.save_loan(&loan, Some(&payments))?;

        info!(
            loan_id = %loan.id,
            score = loan.risk_score,
            risk_level = %loan.risk_level,
            payments = payments.len(),
            "loan created"
        );
        Ok(loan)
    }

    /// Apply a partial update, rescoring risk and regenerating the payment
    /// set when the relevant terms changed.
    pub fn update_loan(&self, id: &str, patch: LoanPatch) -> LoanbookResult<Loan> {
        let mut offsets = self.lock()?;

        let mut loan = self.get_loan(id)?;
        patch.validate_against(&loan)?;
        let effect = loan.apply(patch, Utc::now());

        if effect.risk_changed {
            debug!(
                loan_id = %loan.id,
                score = loan.risk_score,
                risk_level = %loan.risk_level,
                "risk recomputed"
            );
        }

        let payments = if effect.schedule_changed {
            let regenerated = generate_payments_for_loan(&loan, &mut *offsets)?;
            debug!(loan_id = %loan.id, payments = regenerated.len(), "payments regenerated");
            Some(regenerated)
        } else {
            None
        };
        self.repository.save_loan(&loan, payments.as_deref())?;

        info!(loan_id = %loan.id, "loan updated");
        Ok(loan)
    }

    /// Remove a loan and its payments.
    pub fn delete_loan(&self, id: &str) -> LoanbookResult<Loan> {
        let _guard = self.lock()?;
        let removed = self
            .repository
            .delete_loan(id)?
            .ok_or_else(|| LoanbookError::not_found("Loan", id))?;
        info!(loan_id = %removed.id, "loan deleted");
        Ok(removed)
    }

    /// A loan's payments in payment-number order.
    pub fn get_payments(&self, loan_id: &str) -> LoanbookResult<Vec<Payment>> {
        if self.repository.find_loan(loan_id)?.is_none() {
            return Err(LoanbookError::not_found("Loan", loan_id));
        }
        self.repository.payments_for_loan(loan_id)
    }

    /// Record a payment's status. Paid and late payments keep `paid_date`
    /// (today when omitted); other statuses clear it.
    pub fn update_payment_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
        paid_date: Option<NaiveDate>,
    ) -> LoanbookResult<Payment> {
        let _guard = self.lock()?;

        let mut payment = self
            .repository
            .find_payment(payment_id)?
            .ok_or_else(|| LoanbookError::not_found("Payment", payment_id))?;
        let now = Utc::now();
        payment.record_status(status, paid_date, now.date_naive(), now);
        self.repository.save_payment(&payment)?;

        info!(payment_id = %payment.id, status = %status, "payment status updated");
        Ok(payment)
    }

    /// Dashboard figures for the whole book as of a date.
    pub fn analytics(&self, as_of: NaiveDate) -> LoanbookResult<PortfolioAnalytics> {
        let loans = self.repository.list_loans()?;
        let payments = self.repository.list_payments()?;
        Ok(portfolio_analytics(&loans, &payments, as_of))
    }
}
