//! Persistence port for loans and their payments, plus an in-memory adapter.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::loan::{Loan, LoanId};
use super::payment::Payment;
use crate::{LoanbookError, LoanbookResult};

/// Record store for loans and payments.
///
/// Implementations must apply `save_loan` (loan plus optional payment set)
/// and `delete_loan` (loan plus its payments) as single atomic writes.
pub trait LoanRepository: Send + Sync {
    /// Look up a loan by ID.
    fn find_loan(&self, id: &str) -> LoanbookResult<Option<Loan>>;

    /// All loans, in creation order.
    fn list_loans(&self) -> LoanbookResult<Vec<Loan>>;

    /// Insert or replace a loan. When `payments` is given the loan's payment
    /// set is replaced wholesale in the same write.
    fn save_loan(&self, loan: &Loan, payments: Option<&[Payment]>) -> LoanbookResult<()>;

    /// Remove a loan and all of its payments, returning the removed loan.
    fn delete_loan(&self, id: &str) -> LoanbookResult<Option<Loan>>;

    /// A loan's payments ordered by payment number.
    fn payments_for_loan(&self, loan_id: &str) -> LoanbookResult<Vec<Payment>>;

    /// Every stored payment.
    fn list_payments(&self) -> LoanbookResult<Vec<Payment>>;

    fn find_payment(&self, id: &str) -> LoanbookResult<Option<Payment>>;

    /// Replace a single existing payment.
    fn save_payment(&self, payment: &Payment) -> LoanbookResult<()>;
}

#[derive(Debug, Default)]
struct Book {
    loans: Vec<Loan>,
    payments: HashMap<LoanId, Vec<Payment>>,
}

/// In-memory implementation of `LoanRepository`.
///
/// Suitable for tests, demos and the CLI. Not durable.
#[derive(Debug, Default)]
pub struct InMemoryLoanRepository {
    book: RwLock<Book>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored loans.
    pub fn len(&self) -> usize {
        self.read().map(|b| b.loans.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> LoanbookResult<RwLockReadGuard<'_, Book>> {
        self.book
            .read()
            .map_err(|_| LoanbookError::Storage("loan book lock poisoned".into()))
    }

    fn write(&self) -> LoanbookResult<RwLockWriteGuard<'_, Book>> {
        self.book
            .write()
            .map_err(|_| LoanbookError::Storage("loan book lock poisoned".into()))
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn find_loan(&self, id: &str) -> LoanbookResult<Option<Loan>> {
        let book = self.read()?;
        Ok(book.loans.iter().find(|l| l.id == id).cloned())
    }

    fn list_loans(&self) -> LoanbookResult<Vec<Loan>> {
        Ok(self.read()?.loans.clone())
    }

    fn save_loan(&self, loan: &Loan, payments: Option<&[Payment]>) -> LoanbookResult<()> {
        let mut book = self.write()?;
        match book.loans.iter().position(|l| l.id == loan.id) {
            Some(idx) => book.loans[idx] = loan.clone(),
            None => book.loans.push(loan.clone()),
        }
        if let Some(payments) = payments {
            let mut set = payments.to_vec();
            set.sort_by_key(|p| p.payment_number);
            book.payments.insert(loan.id.clone(), set);
        }
        Ok(())
    }

    fn delete_loan(&self, id: &str) -> LoanbookResult<Option<Loan>> {
        let mut book = self.write()?;
        let Some(idx) = book.loans.iter().position(|l| l.id == id) else {
            return Ok(None);
        };
        let removed = book.loans.remove(idx);
        book.payments.remove(id);
        Ok(Some(removed))
    }

    fn payments_for_loan(&self, loan_id: &str) -> LoanbookResult<Vec<Payment>> {
        let book = self.read()?;
        Ok(book.payments.get(loan_id).cloned().unwrap_or_default())
    }

    fn list_payments(&self) -> LoanbookResult<Vec<Payment>> {
        let book = self.read()?;
        Ok(book
            .loans
            .iter()
            .filter_map(|l| book.payments.get(&l.id))
            .flatten()
            .cloned()
            .collect())
    }

    fn find_payment(&self, id: &str) -> LoanbookResult<Option<Payment>> {
        let book = self.read()?;
        Ok(book
            .payments
            .values()
            .flatten()
            .find(|p| p.id == id)
            .cloned())
    }

    fn save_payment(&self, payment: &Payment) -> LoanbookResult<()> {
        let mut book = self.write()?;
        let slot = book
            .payments
            .get_mut(&payment.loan_id)
            .and_then(|set| set.iter_mut().find(|p| p.id == payment.id))
            .ok_or_else(|| LoanbookError::not_found("Payment", &payment.id))?;
        *slot = payment.clone();
        Ok(())
    }
}
