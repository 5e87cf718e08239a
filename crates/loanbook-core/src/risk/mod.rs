pub mod scoring;

pub use scoring::{
    assess_risk, classify_risk, loan_to_value, score_risk, RiskAssessment, RiskFactor, RiskInput,
    RiskLevel,
};
