use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{types::*, LoanbookError, LoanbookResult};

const BASE_SCORE: i32 = 50;
const MIN_CREDIT_SCORE: u32 = 300;
const MAX_CREDIT_SCORE: u32 = 850;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskInput {
    pub amount: Money,
    pub interest_rate: Percent,
    pub term_months: u32,
    /// Bureau-style score, 300 to 850. Zero means no score on file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    /// Value of pledged collateral.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Money>,
}

/// Ordered risk bucket derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "This loan has a low risk profile with strong indicators for repayment."
            }
            RiskLevel::Medium => {
                "This loan has a moderate risk profile with acceptable repayment indicators."
            }
            RiskLevel::High => "This loan has elevated risk factors that may affect repayment.",
            RiskLevel::VeryHigh => {
                "This loan has significant risk factors that require close monitoring."
            }
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::VeryHigh => write!(f, "very-high"),
        }
    }
}

/// One heuristic adjustment that fired, in signed score points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub level: RiskLevel,
    pub loan_to_value: Percent,
    pub factors: Vec<RiskFactor>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Heuristic 0-100 risk score. Higher is riskier.
///
/// Starts at 50 and applies fixed adjustments for credit score, loan-to-value,
/// rate and term. Credit scores 600-649 and LTVs 80-90% deliberately leave the
/// score untouched.
pub fn score_risk(input: &RiskInput) -> u8 {
    let total: i32 = BASE_SCORE + factor_points(input).iter().map(|(_, p)| p).sum::<i32>();
    total.clamp(0, 100) as u8
}

/// Bucket a score: <30 low, <60 medium, <80 high, otherwise very high.
pub fn classify_risk(score: u8) -> RiskLevel {
    match score {
        0..=29 => RiskLevel::Low,
        30..=59 => RiskLevel::Medium,
        60..=79 => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    }
}

/// Loan-to-value in percent; 100 when there is no (or zero) collateral.
/// Saturates when the ratio leaves the decimal range.
pub fn loan_to_value(amount: Money, collateral: Option<Money>) -> Percent {
    match collateral {
        Some(value) if !value.is_zero() => amount
            .checked_div(value)
            .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(dec!(100))),
        _ => dec!(100),
    }
}

/// A credit score of zero is the same as no score.
pub fn known_credit_score(credit_score: Option<u32>) -> Option<u32> {
    credit_score.filter(|cs| *cs != 0)
}

/// Validated risk assessment with the factor breakdown.
pub fn assess_risk(input: &RiskInput) -> LoanbookResult<ComputationOutput<RiskAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_risk_input(input)?;

    if known_credit_score(input.credit_score).is_none() {
        warnings.push("No credit score supplied; credit factor skipped".into());
    }
    if input.collateral.map_or(true, |c| c.is_zero()) {
        warnings.push("Unsecured loan; loan-to-value taken as 100%".into());
    }

    let score = score_risk(input);
    let output = RiskAssessment {
        score,
        level: classify_risk(score),
        loan_to_value: loan_to_value(input.amount, input.collateral),
        factors: factor_points(input)
            .into_iter()
            .map(|(factor, points)| RiskFactor {
                factor: factor.to_string(),
                points,
            })
            .collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "base_score": BASE_SCORE,
        "level_thresholds": [30, 60, 80],
    });

    Ok(with_metadata(
        "Additive loan risk heuristic",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn factor_points(input: &RiskInput) -> Vec<(&'static str, i32)> {
    let mut factors = Vec::with_capacity(4);

    if let Some(cs) = known_credit_score(input.credit_score) {
        let points = if cs >= 750 {
            -20
        } else if cs >= 700 {
            -15
        } else if cs >= 650 {
            -5
        } else if cs < 600 {
            20
        } else {
            0
        };
        if points != 0 {
            factors.push(("credit_score", points));
        }
    }

    let ltv = loan_to_value(input.amount, input.collateral);
    let ltv_points = if ltv < dec!(50) {
        -15
    } else if ltv < dec!(80) {
        -5
    } else if ltv > dec!(90) {
        15
    } else {
        0
    };
    if ltv_points != 0 {
        factors.push(("loan_to_value", ltv_points));
    }

    if input.interest_rate > dec!(8) {
        factors.push(("interest_rate", 10));
    } else if input.interest_rate < dec!(4) {
        factors.push(("interest_rate", -10));
    }

    if input.term_months > 180 {
        factors.push(("term", 5));
    } else if input.term_months < 36 {
        factors.push(("term", -5));
    }

    factors
}

fn validate_risk_input(input: &RiskInput) -> LoanbookResult<()> {
    if input.amount <= Decimal::ZERO {
        return Err(LoanbookError::invalid("amount", "Amount must be positive"));
    }
    if input.interest_rate < Decimal::ZERO || input.interest_rate > dec!(100) {
        return Err(LoanbookError::invalid(
            "interest_rate",
            "Interest rate must be between 0 and 100",
        ));
    }
    if input.term_months == 0 {
        return Err(LoanbookError::invalid("term_months", "Term must be positive"));
    }
    validate_credit_score(input.credit_score)?;
    validate_collateral(input.collateral)?;
    Ok(())
}

pub(crate) fn validate_credit_score(credit_score: Option<u32>) -> LoanbookResult<()> {
    if let Some(cs) = known_credit_score(credit_score) {
        if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&cs) {
            return Err(LoanbookError::invalid(
                "credit_score",
                format!("Credit score must be between {MIN_CREDIT_SCORE} and {MAX_CREDIT_SCORE}"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_collateral(collateral: Option<Money>) -> LoanbookResult<()> {
    if let Some(c) = collateral {
        if c < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "collateral",
                "Collateral cannot be negative",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
