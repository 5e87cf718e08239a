pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::LoanbookError;
pub use types::*;

/// Standard result type for all loanbook operations
pub type LoanbookResult<T> = Result<T, LoanbookError>;
