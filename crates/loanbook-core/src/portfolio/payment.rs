use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::loan::LoanId;
use crate::types::Money;

/// Payment identifier, `"{loan_id}-{payment_number}"`.
pub type PaymentId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Late,
    Missed,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Late,
        PaymentStatus::Missed,
    ];

    /// Money actually arrived (on time or not).
    pub fn is_received(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Late)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Late => write!(f, "late"),
            PaymentStatus::Missed => write!(f, "missed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub payment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub principal: Money,
    pub interest: Money,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn payment_id(loan_id: &str, payment_number: u32) -> PaymentId {
        format!("{loan_id}-{payment_number}")
    }

    /// Record a new status. Received payments keep a paid date (defaulting to
    /// `today`); pending and missed payments drop it.
    pub fn record_status(
        &mut self,
        status: PaymentStatus,
        paid_date: Option<NaiveDate>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.paid_date = status.is_received().then(|| paid_date.unwrap_or(today));
        self.updated_at = now;
    }
}
