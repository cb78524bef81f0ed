pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "debt")]
pub mod debt;

#[cfg(feature = "goals")]
pub mod goals;

#[cfg(feature = "format")]
pub mod format;

pub use error::TrezoError;
pub use types::*;

/// Standard result type for all Trézo computations
pub type TrezoResult<T> = Result<T, TrezoError>;
