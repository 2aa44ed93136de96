//! Result type aliases for daogen.

use crate::DaogenError;

/// A specialized `Result` type for daogen operations.
pub type DaogenResult<T> = Result<T, DaogenError>;
