//! Convenience result type alias for Cimaise.

use crate::error::AppError;

/// A specialized `Result` type for Cimaise operations.
pub type AppResult<T> = Result<T, AppError>;
