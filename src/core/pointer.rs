//! Purpose: Render pointer addresses for diagnostics.
//! Exports: `format_pointer`, `PointerBound`.
//! Role: Trivial collaborator; pure formatting plus range validation.
//! Invariants: Output is `0x` plus exactly 16 upper-case hex digits.

use std::error::Error as StdError;
use std::fmt;

use crate::core::error::{Error, ErrorKind};

const POINTER_MAX: i128 = u64::MAX as i128;

/// The specific range bound a pointer value violated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PointerBound {
    Negative(i128),
    AboveMax(i128),
}

impl fmt::Display for PointerBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative(value) => write!(f, "pointer address {value} is negative"),
            Self::AboveMax(value) => write!(
                f,
                "pointer address {value} exceeds the 64-bit maximum {POINTER_MAX}"
            ),
        }
    }
}

impl StdError for PointerBound {}

/// Formats an unsigned 64-bit pointer value as fixed-width upper-case hex.
pub fn format_pointer(value: i128) -> Result<String, Error> {
    let bound = if value < 0 {
        PointerBound::Negative(value)
    } else if value > POINTER_MAX {
        PointerBound::AboveMax(value)
    } else {
        return Ok(format!("0x{:016X}", value as u64));
    };
    Err(Error::new(ErrorKind::InvalidPointer)
        .with_message("invalid pointer address")
        .with_source(bound))
}
