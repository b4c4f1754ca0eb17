//! Result type alias for nomenclature import operations

use crate::error::NomenError;

/// Standard Result type for nomenclature import operations
pub type Result<T> = std::result::Result<T, NomenError>;
