use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrezoError {
    #[error("Invalid debt parameters for {field}: {reason}")]
    InvalidDebtParameters { field: String, reason: String },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),
}

impl TrezoError {
    pub(crate) fn debt(field: &str, reason: impl Into<String>) -> Self {
        TrezoError::InvalidDebtParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending input field, when the error carries one.
    pub fn field(&self) -> Option<&str> {
        match self {
            TrezoError::InvalidDebtParameters { field, .. }
            | TrezoError::InvalidInput { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}
