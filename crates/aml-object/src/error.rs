//! AML Object Errors
//!
//! Recoverable error conditions reported by object operations.
//! Defects (undefined references, impossible node kinds) never appear here;
//! they are routed to `Diagnostics::fatal` instead.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmlError {
    // Value errors
    #[error("type mismatch")]
    TypeMismatch,
    #[error("illegal arguments")]
    IllegalArguments,
    #[error("index out of bounds")]
    OutOfBounds,

    // Resource errors
    #[error("out of memory")]
    OutOfMemory,

    // Name grammar
    #[error("malformed AML name at byte {offset}")]
    MalformedName { offset: usize },
}

pub type AmlResult<T> = Result<T, AmlError>;
