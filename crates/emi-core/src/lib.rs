pub mod annuity;
pub mod error;
pub mod rate_changes;
pub mod schedule;
pub mod types;

#[cfg(feature = "analysis")]
pub mod analysis;

#[cfg(feature = "analysis")]
pub mod summary;

pub use error::LoanError;
pub use types::*;

/// Standard result type for all loan engine operations
pub type LoanResult<T> = Result<T, LoanError>;
