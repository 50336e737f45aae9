pub mod error;
pub mod types;
pub mod value_at_risk;

pub use error::VarError;
pub use types::*;

/// Standard result type for all VaR operations
pub type VarResult<T> = Result<T, VarError>;
