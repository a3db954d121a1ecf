use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Negative amortization at month {month}: \
         installment {installment} does not cover interest {interest}"
    )]
    NegativeAmortization {
        month: u32,
        installment: Decimal,
        interest: Decimal,
    },

    #[error("Tenure limit exceeded: schedule would run past {limit} months")]
    TenureLimitExceeded { limit: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::SerializationError(e.to_string())
    }
}
