use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallmentError {
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Invalid down payment: {0}")]
    InvalidDownPayment(String),

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Unknown schedule entry: {0}")]
    UnknownEntry(String),

    #[error("Installment {0} is already marked paid")]
    AlreadyPaid(String),

    #[error("Installment {0} is not marked paid")]
    NotPaid(String),

    #[error("Invalid amount for installment {entry_id}: {reason}")]
    InvalidAmount { entry_id: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for InstallmentError {
    fn from(e: serde_json::Error) -> Self {
        InstallmentError::SerializationError(e.to_string())
    }
}
