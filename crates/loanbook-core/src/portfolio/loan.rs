use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::amortization::calculators::{
    validate_amortizable, validate_principal, validate_rate, validate_term,
};
use crate::risk::scoring::{known_credit_score, validate_collateral, validate_credit_score};
use crate::risk::{classify_risk, score_risk, RiskInput, RiskLevel};
use crate::{types::*, LoanbookError, LoanbookResult};

/// Opaque loan identifier assigned at creation.
pub type LoanId = String;

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Pending,
    Active,
    Paid,
    Defaulted,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Pending,
        LoanStatus::Active,
        LoanStatus::Paid,
        LoanStatus::Defaulted,
    ];
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Pending => write!(f, "pending"),
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Paid => write!(f, "paid"),
            LoanStatus::Defaulted => write!(f, "defaulted"),
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = LoanbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanStatus::ALL
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                LoanbookError::invalid(
                    "status",
                    format!("Unknown loan status '{s}' (pending, active, paid, defaulted)"),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub name: String,
    pub amount: Money,
    pub interest_rate: Percent,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
    pub borrower_name: String,
    pub borrower_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Money>,
}

/// Everything needed to open a loan; identity, timestamps and risk are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDraft {
    pub name: String,
    pub amount: Money,
    pub interest_rate: Percent,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_name: String,
    pub borrower_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Money>,
}

/// Partial update. `None` leaves a field as it is.
///
/// The optional loan fields take a second layer: `Some(None)` (JSON `null`)
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanPatch {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub interest_rate: Option<Percent>,
    pub term_months: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<LoanStatus>,
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<Option<u32>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Option<Money>>,
}

/// A field that appears in the payload, `null` included.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Which derived data a patch invalidated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchEffect {
    pub risk_changed: bool,
    pub schedule_changed: bool,
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

impl Loan {
    /// Open a loan from a validated draft, scoring its risk.
    pub fn open(id: LoanId, draft: LoanDraft, now: DateTime<Utc>) -> Self {
        let mut loan = Loan {
            id,
            name: draft.name,
            amount: draft.amount,
            interest_rate: draft.interest_rate,
            term_months: draft.term_months,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: draft.status,
            borrower_name: draft.borrower_name,
            borrower_email: draft.borrower_email,
            description: draft.description,
            created_at: now,
            updated_at: now,
            risk_score: 0,
            risk_level: RiskLevel::Low,
            credit_score: known_credit_score(draft.credit_score),
            collateral: draft.collateral,
        };
        loan.rescore();
        loan
    }

    pub fn risk_input(&self) -> RiskInput {
        RiskInput {
            amount: self.amount,
            interest_rate: self.interest_rate,
            term_months: self.term_months,
            credit_score: self.credit_score,
            collateral: self.collateral,
        }
    }

    /// Recompute the stored risk fields from the current terms.
    pub fn rescore(&mut self) {
        self.risk_score = score_risk(&self.risk_input());
        self.risk_level = classify_risk(self.risk_score);
    }

    /// Apply a patch in place and report which derived data went stale.
    ///
    /// Only fields whose value actually changes count. Risk is rescored here;
    /// payment regeneration is left to the caller.
    pub fn apply(&mut self, patch: LoanPatch, now: DateTime<Utc>) -> PatchEffect {
        let mut effect = PatchEffect::default();

        if let Some(amount) = patch.amount.filter(|v| *v != self.amount) {
            self.amount = amount;
            effect.risk_changed = true;
            effect.schedule_changed = true;
        }
        if let Some(rate) = patch.interest_rate.filter(|v| *v != self.interest_rate) {
            self.interest_rate = rate;
            effect.risk_changed = true;
            effect.schedule_changed = true;
        }
        if let Some(term) = patch.term_months.filter(|v| *v != self.term_months) {
            self.term_months = term;
            effect.risk_changed = true;
            effect.schedule_changed = true;
        }
        if let Some(start) = patch.start_date.filter(|v| *v != self.start_date) {
            self.start_date = start;
            effect.schedule_changed = true;
        }
        if let Some(cs) = patch
            .credit_score
            .map(known_credit_score)
            .filter(|v| *v != self.credit_score)
        {
            self.credit_score = cs;
            effect.risk_changed = true;
        }
        if let Some(c) = patch.collateral.filter(|v| *v != self.collateral) {
            self.collateral = c;
            effect.risk_changed = true;
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(borrower) = patch.borrower_name {
            self.borrower_name = borrower;
        }
        if let Some(email) = patch.borrower_email {
            self.borrower_email = email;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }

        if effect.risk_changed {
            self.rescore();
        }
        self.updated_at = now;
        effect
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl LoanDraft {
    pub fn validate(&self) -> LoanbookResult<()> {
        validate_text("name", &self.name)?;
        validate_principal("amount", self.amount)?;
        validate_rate("interest_rate", self.interest_rate)?;
        validate_term("term_months", self.term_months)?;
        validate_amortizable(self.amount, self.interest_rate, self.term_months)?;
        validate_dates(self.start_date, self.end_date)?;
        validate_text("borrower_name", &self.borrower_name)?;
        validate_email(&self.borrower_email)?;
        validate_credit_score(self.credit_score)?;
        validate_collateral(self.collateral)?;
        Ok(())
    }
}

impl LoanPatch {
    /// Validate the patch against the loan it will be applied to.
    pub fn validate_against(&self, loan: &Loan) -> LoanbookResult<()> {
        if let Some(name) = &self.name {
            validate_text("name", name)?;
        }
        if let Some(amount) = self.amount {
            validate_principal("amount", amount)?;
        }
        if let Some(rate) = self.interest_rate {
            validate_rate("interest_rate", rate)?;
        }
        if let Some(term) = self.term_months {
            validate_term("term_months", term)?;
        }
        validate_amortizable(
            self.amount.unwrap_or(loan.amount),
            self.interest_rate.unwrap_or(loan.interest_rate),
            self.term_months.unwrap_or(loan.term_months),
        )?;
        validate_dates(
            self.start_date.unwrap_or(loan.start_date),
            self.end_date.unwrap_or(loan.end_date),
        )?;
        if let Some(borrower) = &self.borrower_name {
            validate_text("borrower_name", borrower)?;
        }
        if let Some(email) = &self.borrower_email {
            validate_email(email)?;
        }
        validate_credit_score(self.credit_score.flatten())?;
        validate_collateral(self.collateral.flatten())?;
        Ok(())
    }
}

fn validate_text(field: &str, value: &str) -> LoanbookResult<()> {
    if value.trim().is_empty() {
        return Err(LoanbookError::invalid(field, "Value is required"));
    }
    Ok(())
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> LoanbookResult<()> {
    if end < start {
        return Err(LoanbookError::DateError(format!(
            "End date {end} precedes start date {start}"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> LoanbookResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(LoanbookError::invalid("borrower_email", "Invalid email address"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap()
    }

    fn draft() -> LoanDraft {
        LoanDraft {
            name: "Home Mortgage".into(),
            amount: dec!(250000),
            interest_rate: dec!(4.5),
            term_months: 360,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2053, 1, 15).unwrap(),
            status: LoanStatus::Active,
            borrower_name: "John Smith".into(),
            borrower_email: "john.smith@example.com".into(),
            description: None,
            credit_score: Some(780),
            collateral: Some(dec!(300000)),
        }
    }

    #[test]
    fn test_open_scores_risk() {
        let loan = Loan::open("1".into(), draft(), now());
        assert_eq!(loan.risk_score, 35);
        assert_eq!(loan.risk_level, RiskLevel::Medium);
        assert_eq!(loan.created_at, loan.updated_at);
    }

    #[test]
    fn test_apply_rate_change_rescores_and_invalidates_schedule() {
        let mut loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            interest_rate: Some(dec!(9)),
            ..Default::default()
        };
        let effect = loan.apply(patch, now());
        assert!(effect.risk_changed);
        assert!(effect.schedule_changed);
        assert_eq!(loan.risk_score, 45);
    }

    #[test]
    fn test_apply_credit_score_only_rescores() {
        let mut loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            credit_score: Some(Some(580)),
            ..Default::default()
        };
        let effect = loan.apply(patch, now());
        assert!(effect.risk_changed);
        assert!(!effect.schedule_changed);
        // 50 + 20 + 0 + 0 + 5
        assert_eq!(loan.risk_score, 75);
        assert_eq!(loan.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_apply_start_date_only_regenerates_schedule() {
        let mut loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            start_date: NaiveDate::from_ymd_opt(2023, 2, 15),
            ..Default::default()
        };
        let effect = loan.apply(patch, now());
        assert!(!effect.risk_changed);
        assert!(effect.schedule_changed);
    }

    #[test]
    fn test_apply_unchanged_values_is_a_no_op() {
        let mut loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            amount: Some(dec!(250000)),
            term_months: Some(360),
            status: Some(LoanStatus::Paid),
            ..Default::default()
        };
        let effect = loan.apply(patch, now());
        assert_eq!(effect, PatchEffect::default());
        assert_eq!(loan.status, LoanStatus::Paid);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut d = draft();
        d.amount = dec!(0);
        assert!(d.validate().is_err());

        let mut d = draft();
        d.borrower_email = "not-an-email".into();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(matches!(d.validate(), Err(LoanbookError::DateError(_))));

        let mut d = draft();
        d.credit_score = Some(200);
        assert!(d.validate().is_err());

        let mut d = draft();
        d.name = "   ".into();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_patch_validation_uses_existing_dates() {
        let loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            end_date: NaiveDate::from_ymd_opt(2022, 12, 31),
            ..Default::default()
        };
        assert!(patch.validate_against(&loan).is_err());
    }

    #[test]
    fn test_patch_null_clears_optional_fields() {
        let mut d = draft();
        d.description = Some("Primary residence".into());
        let mut loan = Loan::open("1".into(), d, now());

        let patch: LoanPatch =
            serde_json::from_str(r#"{"collateral": null, "description": null}"#).unwrap();
        assert_eq!(patch.collateral, Some(None));
        assert_eq!(patch.credit_score, None);
        assert!(patch.validate_against(&loan).is_ok());

        let effect = loan.apply(patch, now());
        assert!(effect.risk_changed);
        assert_eq!(loan.collateral, None);
        assert_eq!(loan.description, None);
        assert_eq!(loan.credit_score, Some(780));
        // Unsecured now: 50 − 20 + 15 + 0 + 5
        assert_eq!(loan.risk_score, 50);
    }

    #[test]
    fn test_zero_credit_score_means_no_score() {
        let mut d = draft();
        d.credit_score = Some(0);
        assert!(d.validate().is_ok());
        let mut loan = Loan::open("1".into(), d, now());
        assert_eq!(loan.credit_score, None);

        let patch = LoanPatch {
            credit_score: Some(Some(700)),
            ..Default::default()
        };
        loan.apply(patch, now());
        assert_eq!(loan.credit_score, Some(700));

        let patch = LoanPatch {
            credit_score: Some(Some(0)),
            ..Default::default()
        };
        assert!(patch.validate_against(&loan).is_ok());
        assert!(loan.apply(patch, now()).risk_changed);
        assert_eq!(loan.credit_score, None);
    }

    #[test]
    fn test_validation_rejects_unamortizable_terms() {
        let mut d = draft();
        d.interest_rate = dec!(100);
        d.term_months = 900;
        assert!(matches!(
            d.validate(),
            Err(LoanbookError::InvalidInput { ref field, .. }) if field == "term_months"
        ));

        let loan = Loan::open("1".into(), draft(), now());
        let patch = LoanPatch {
            interest_rate: Some(dec!(50)),
            term_months: Some(1500),
            ..Default::default()
        };
        assert!(patch.validate_against(&loan).is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LoanStatus::Defaulted).unwrap(), "\"defaulted\"");
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!("Active".parse::<LoanStatus>().unwrap(), LoanStatus::Active);
        assert_eq!(" paid ".parse::<LoanStatus>().unwrap(), LoanStatus::Paid);
        assert!("closed".parse::<LoanStatus>().is_err());
    }
}
