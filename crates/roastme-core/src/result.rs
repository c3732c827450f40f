//! Convenience result type alias for Roast Me.

use crate::error::AppError;

/// A specialized `Result` type for Roast Me operations.
pub type AppResult<T> = Result<T, AppError>;
