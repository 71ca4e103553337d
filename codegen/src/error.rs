//! Error types for suffix resolution.

use std::fmt;

/// The activation's type code has no entry in the type mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedTypeError {
    pub i_type: i32,
}

impl fmt::Display for UnresolvedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type code {} is not in the type mapping", self.i_type)
    }
}

impl std::error::Error for UnresolvedTypeError {}
