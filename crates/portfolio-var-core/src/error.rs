use thiserror::Error;

#[derive(Debug, Error)]
pub enum VarError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VarError {
    pub(crate) fn parameter(field: &str, reason: impl Into<String>) -> Self {
        VarError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VarError {
    fn from(e: serde_json::Error) -> Self {
        VarError::SerializationError(e.to_string())
    }
}
