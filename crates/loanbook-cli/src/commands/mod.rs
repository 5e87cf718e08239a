pub mod calculators;
pub mod portfolio;
pub mod risk;
